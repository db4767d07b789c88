use linetrans_core::record::{encode_record_line, parse_record_line};
use linetrans_core::{LineEvent, LineStatus, TransformedRecord};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::config::TranslateConfig;
use crate::error::PipelineError;
use crate::executor::{CompletionTransport, RequestExecutor};
use crate::processor::RecordProcessor;
use crate::progress::Progress;
use crate::status_log::StatusLog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_lines: u64,
    pub records_written: u64,
    pub abandoned_fields: u64,
    pub malformed_lines: u64,
    pub output_path: PathBuf,
}

/// Streams input lines through the record processor, appending one output line
/// per input line, in input order.
pub struct PipelineDriver<'a> {
    config: &'a TranslateConfig,
    transport: &'a dyn CompletionTransport,
    status_log: &'a dyn StatusLog,
}

impl<'a> PipelineDriver<'a> {
    pub fn new(
        config: &'a TranslateConfig,
        transport: &'a dyn CompletionTransport,
        status_log: &'a dyn StatusLog,
    ) -> Self {
        Self {
            config,
            transport,
            status_log,
        }
    }

    pub fn run(&self, input_path: &Path, output_path: &Path) -> Result<RunSummary, PipelineError> {
        let total_lines = count_lines(input_path)?;
        let input = File::open(input_path).map_err(|source| PipelineError::OpenInput {
            path: input_path.to_path_buf(),
            source,
        })?;
        let mut output = OpenOptions::new()
            .create(true)
            .append(true)
            .open(output_path)
            .map_err(|source| PipelineError::OpenOutput {
                path: output_path.to_path_buf(),
                source,
            })?;
        log::info!(
            "translating {} lines: input={} output={}",
            total_lines,
            input_path.display(),
            output_path.display()
        );

        let executor = RequestExecutor::new(self.config, self.transport, self.status_log);
        let processor = RecordProcessor::new(&executor, self.config.concurrent_fields);
        let progress = Progress::new(total_lines, self.config.show_progress);
        let mut summary = RunSummary {
            total_lines,
            records_written: 0,
            abandoned_fields: 0,
            malformed_lines: 0,
            output_path: output_path.to_path_buf(),
        };

        let mut line_number: u64 = 0;
        for raw in BufReader::new(input).split(b'\n') {
            let raw = raw.map_err(|source| PipelineError::ReadInput {
                path: input_path.to_path_buf(),
                source,
            })?;
            line_number += 1;

            let transformed = match decode_line(&raw) {
                Ok(record) => {
                    let transformed = processor.process(&record, line_number);
                    summary.abandoned_fields += transformed.absent_fields() as u64;
                    transformed
                }
                Err(detail) => {
                    summary.malformed_lines += 1;
                    self.status_log.record(&LineEvent::for_line(
                        line_number,
                        LineStatus::MalformedInput(detail),
                    ));
                    TransformedRecord::absent()
                }
            };

            append_record(&mut output, output_path, line_number, &transformed)?;
            summary.records_written += 1;
            progress.advance();
        }

        progress.finish(format!("saved to {}", output_path.display()));
        log::info!(
            "translation finished: records={} abandoned_fields={} malformed_lines={} output={}",
            summary.records_written,
            summary.abandoned_fields,
            summary.malformed_lines,
            output_path.display()
        );
        Ok(summary)
    }
}

/// Pre-scan for the progress total. Splits exactly like the main loop.
pub fn count_lines(path: &Path) -> Result<u64, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut count = 0;
    for chunk in BufReader::new(file).split(b'\n') {
        chunk.map_err(|source| PipelineError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        count += 1;
    }
    Ok(count)
}

fn decode_line(raw: &[u8]) -> Result<linetrans_core::Record, String> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let text = std::str::from_utf8(raw).map_err(|err| format!("invalid utf-8: {err}"))?;
    parse_record_line(text).map_err(|err| err.to_string())
}

fn append_record(
    output: &mut File,
    output_path: &Path,
    line_number: u64,
    record: &TransformedRecord,
) -> Result<(), PipelineError> {
    let mut line = encode_record_line(record).map_err(|source| PipelineError::EncodeRecord {
        line: line_number,
        source,
    })?;
    line.push('\n');
    // 中文注释：每条记录单独写入并 flush，崩溃时最多丢失正在处理的那一条。
    output
        .write_all(line.as_bytes())
        .and_then(|()| output.flush())
        .map_err(|source| PipelineError::WriteOutput {
            path: output_path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status_log::MemoryStatusLog;
    use crate::test_support::{fast_config, ok_reply, ScriptedTransport};
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("linetrans-driver-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn count_lines_matches_split_semantics() {
        let dir = temp_dir("count");
        let path = dir.join("in.jsonl");
        fs::write(&path, "{}\n{}\r\n{}").expect("write input");
        assert_eq!(count_lines(&path).expect("count"), 3);
        fs::write(&path, "{}\n{}\n").expect("write input");
        assert_eq!(count_lines(&path).expect("count"), 2);
        fs::write(&path, "").expect("write input");
        assert_eq!(count_lines(&path).expect("count"), 0);
    }

    #[test]
    fn malformed_lines_still_produce_output() {
        let dir = temp_dir("malformed");
        let input = dir.join("in.jsonl");
        let output = dir.join("out.jsonl");
        let mut bytes = b"{\"instruction\":\"a\"}\nnot json\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"{\"output\":\"c\"}\r\n");
        fs::write(&input, bytes).expect("write input");

        let config = fast_config();
        let transport = ScriptedTransport::new(|content, _| ok_reply(&format!("t:{content}")));
        let log = MemoryStatusLog::default();
        let driver = PipelineDriver::new(&config, &transport, &log);

        let summary = driver.run(&input, &output).expect("run");

        assert_eq!(summary.total_lines, 4);
        assert_eq!(summary.records_written, 4);
        assert_eq!(summary.malformed_lines, 2);
        assert_eq!(summary.abandoned_fields, 0);
        let text = fs::read_to_string(&output).expect("read output");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                r#"{"instruction":"t:a","input":"t:","output":"t:"}"#,
                r#"{"instruction":null,"input":null,"output":null}"#,
                r#"{"instruction":null,"input":null,"output":null}"#,
                r#"{"instruction":"t:","input":"t:","output":"t:c"}"#,
            ]
        );
        let malformed: Vec<u64> = log
            .events()
            .iter()
            .filter(|e| matches!(e.status, LineStatus::MalformedInput(_)))
            .map(|e| e.line_number)
            .collect();
        assert_eq!(malformed, [2, 3]);
        // no remote calls for malformed lines
        assert_eq!(transport.sent().len(), 6);
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = temp_dir("missing");
        let config = fast_config();
        let transport = ScriptedTransport::new(|_, _| ok_reply("x"));
        let log = MemoryStatusLog::default();
        let driver = PipelineDriver::new(&config, &transport, &log);

        let err = driver
            .run(&dir.join("absent.jsonl"), &dir.join("out.jsonl"))
            .expect_err("missing input");
        assert!(matches!(err, PipelineError::OpenInput { .. }));
        assert!(!dir.join("out.jsonl").exists());
    }
}
