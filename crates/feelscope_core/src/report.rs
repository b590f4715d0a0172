//! crates/feelscope_core/src/report.rs
//!
//! Aggregate views over stored records: label counts for charts and the CSV export.

use crate::domain::ClassificationRecord;
use serde::Serialize;
use std::collections::HashMap;

pub const CSV_HEADER: [&str; 6] = ["Text", "Sentiment", "Emotion", "Topic", "Timestamp", "Source"];
const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How many records carry a given label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub sentiments: Vec<LabelCount>,
    pub emotions: Vec<LabelCount>,
}

/// Counts sentiments and emotion labels. Emotion lists count once per element.
/// Buckets keep the order in which each label was first seen.
pub fn chart_data(records: &[ClassificationRecord]) -> ChartData {
    let mut sentiments = Counter::default();
    let mut emotions = Counter::default();

    for record in records {
        sentiments.add(&record.sentiment);
        for label in record.emotion.labels() {
            emotions.add(label);
        }
    }

    ChartData {
        sentiments: sentiments.into_counts(),
        emotions: emotions.into_counts(),
    }
}

#[derive(Default)]
struct Counter {
    index: HashMap<String, usize>,
    counts: Vec<LabelCount>,
}

impl Counter {
    fn add(&mut self, name: &str) {
        match self.index.get(name) {
            Some(&slot) => self.counts[slot].count += 1,
            None => {
                self.index.insert(name.to_string(), self.counts.len());
                self.counts.push(LabelCount {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    fn into_counts(self) -> Vec<LabelCount> {
        self.counts
    }
}

/// Renders records as CSV, one row per record in the given order.
pub fn to_csv(records: &[ClassificationRecord]) -> String {
    let mut out = String::new();
    write_row(&mut out, CSV_HEADER.iter().copied());

    for record in records {
        let emotion = record.emotion.to_string();
        let timestamp = record.timestamp.format(CSV_TIMESTAMP_FORMAT).to_string();
        write_row(
            &mut out,
            [
                record.text.as_str(),
                record.sentiment.as_str(),
                emotion.as_str(),
                record.topic.as_str(),
                timestamp.as_str(),
                record.source.as_str(),
            ],
        );
    }
    out
}

fn write_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
