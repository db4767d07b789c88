use linetrans_core::{Field, Record, TransformedRecord};
use std::thread;

use crate::executor::{RequestExecutor, TransformResult};

pub const USER_ROLE: &str = "user";

/// Translates the three fields of one record. The record is complete only once
/// every field has either text or been abandoned.
pub struct RecordProcessor<'a> {
    executor: &'a RequestExecutor<'a>,
    concurrent_fields: bool,
}

impl<'a> RecordProcessor<'a> {
    pub fn new(executor: &'a RequestExecutor<'a>, concurrent_fields: bool) -> Self {
        Self {
            executor,
            concurrent_fields,
        }
    }

    pub fn process(&self, record: &Record, line_number: u64) -> TransformedRecord {
        let mut result = TransformedRecord::default();
        if self.concurrent_fields {
            let outcomes = thread::scope(|scope| {
                let handles: Vec<_> = Field::ALL
                    .iter()
                    .map(|&field| {
                        let content = record.get(field);
                        let handle = scope.spawn(move || {
                            self.executor.transform(content, USER_ROLE, line_number, field)
                        });
                        (field, handle)
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|(field, handle)| {
                        let outcome = handle.join().unwrap_or_else(|_| {
                            log::error!("field worker panicked: line={line_number} field={field}");
                            TransformResult::Abandoned
                        });
                        (field, outcome)
                    })
                    .collect::<Vec<_>>()
            });
            for (field, outcome) in outcomes {
                result.set(field, outcome.into_option());
            }
        } else {
            for field in Field::ALL {
                let outcome = self
                    .executor
                    .transform(record.get(field), USER_ROLE, line_number, field);
                result.set(field, outcome.into_option());
            }
        }
        result
    }
}
