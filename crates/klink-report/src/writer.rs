//! Streaming JSON report writers.
//!
//! Reports append one record at a time so corpora never need to be fully
//! resident for output. Statistics sections are written after the detail
//! streams, when the aggregators are complete; JSON object key order
//! carries no meaning for the downstream graph loader.

use std::io::Write;

use serde::Serialize;

use klink_core::{Corpus, KlinkError, Result};

// ============================================================================
// JSON array streaming
// ============================================================================

/// Writes a JSON array element by element.
pub struct JsonArrayWriter<W: Write> {
    writer: W,
    first: bool,
}

impl<W: Write> JsonArrayWriter<W> {
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(b"[")?;
        Ok(Self {
            writer,
            first: true,
        })
    }

    pub fn push<T: Serialize>(&mut self, value: &T) -> Result<()> {
        if !self.first {
            self.writer.write_all(b",")?;
        }
        self.first = false;
        serde_json::to_writer(&mut self.writer, value)?;
        Ok(())
    }

    /// Close the array and hand the underlying writer back
    pub fn finish(mut self) -> Result<W> {
        self.writer.write_all(b"]")?;
        Ok(self.writer)
    }
}

// ============================================================================
// Corpus-sectioned reports (entities, relations)
// ============================================================================

enum SectionState {
    /// No corpus section opened yet
    Idle,
    /// Inside a corpus array; tracks whether it has elements
    Open { first_record: bool },
}

/// Writes `{"<detail_key>": {"paper": [...], "article": [...]},
/// "statistics": ..., "generated_at": "..."}` with the detail arrays
/// streamed one record at a time.
pub struct ReportWriter<W: Write> {
    writer: W,
    state: SectionState,
    sections_written: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn create(mut writer: W, detail_key: &str) -> Result<Self> {
        write!(writer, "{{\"{detail_key}\":{{")?;
        Ok(Self {
            writer,
            state: SectionState::Idle,
            sections_written: 0,
        })
    }

    /// Open the detail array for one corpus. Sections must not repeat.
    pub fn begin_corpus(&mut self, corpus: Corpus) -> Result<()> {
        if matches!(self.state, SectionState::Open { .. }) {
            return Err(KlinkError::ReportError(
                "previous corpus section still open".to_string(),
            ));
        }
        if self.sections_written > 0 {
            self.writer.write_all(b",")?;
        }
        write!(self.writer, "\"{}\":[", corpus.as_str())?;
        self.state = SectionState::Open { first_record: true };
        self.sections_written += 1;
        Ok(())
    }

    /// Append one record to the open corpus section
    pub fn push<T: Serialize>(&mut self, record: &T) -> Result<()> {
        match &mut self.state {
            SectionState::Open { first_record } => {
                if !*first_record {
                    self.writer.write_all(b",")?;
                }
                *first_record = false;
                serde_json::to_writer(&mut self.writer, record)?;
                Ok(())
            }
            SectionState::Idle => Err(KlinkError::ReportError(
                "no corpus section open".to_string(),
            )),
        }
    }

    pub fn end_corpus(&mut self) -> Result<()> {
        match self.state {
            SectionState::Open { .. } => {
                self.writer.write_all(b"]")?;
                self.state = SectionState::Idle;
                Ok(())
            }
            SectionState::Idle => Err(KlinkError::ReportError(
                "no corpus section open".to_string(),
            )),
        }
    }

    /// Close the detail object, append statistics and the timestamp
    pub fn finish<S: Serialize>(mut self, statistics: &S) -> Result<()> {
        if matches!(self.state, SectionState::Open { .. }) {
            self.end_corpus()?;
        }
        self.writer.write_all(b"},\"statistics\":")?;
        serde_json::to_writer(&mut self.writer, statistics)?;
        write!(
            self.writer,
            ",\"generated_at\":\"{}\"}}",
            chrono::Utc::now().to_rfc3339()
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// Document-link report
// ============================================================================

/// Writes `{"document_relations": [...], "statistics": ...}` with links
/// streamed one at a time.
pub struct LinkReportWriter<W: Write> {
    links: JsonArrayWriter<W>,
}

impl<W: Write> LinkReportWriter<W> {
    pub fn create(mut writer: W) -> Result<Self> {
        writer.write_all(b"{\"document_relations\":")?;
        Ok(Self {
            links: JsonArrayWriter::new(writer)?,
        })
    }

    pub fn push<T: Serialize>(&mut self, link: &T) -> Result<()> {
        self.links.push(link)
    }

    pub fn finish<S: Serialize>(self, statistics: &S) -> Result<()> {
        let mut writer = self.links.finish()?;
        writer.write_all(b",\"statistics\":")?;
        serde_json::to_writer(&mut writer, statistics)?;
        write!(
            writer,
            ",\"generated_at\":\"{}\"}}",
            chrono::Utc::now().to_rfc3339()
        )?;
        writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_json_array_writer() {
        let mut array = JsonArrayWriter::new(Vec::new()).unwrap();
        array.push(&json!({"a": 1})).unwrap();
        array.push(&json!(2)).unwrap();
        let bytes = array.finish().unwrap();

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!([{"a": 1}, 2]));
    }

    #[test]
    fn test_empty_array() {
        let array = JsonArrayWriter::new(Vec::new()).unwrap();
        let bytes = array.finish().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!([]));
    }

    #[test]
    fn test_report_writer_sections() {
        let mut buffer = Vec::new();
        {
            let mut report = ReportWriter::create(&mut buffer, "detailed_entities").unwrap();
            report.begin_corpus(Corpus::Paper).unwrap();
            report.push(&json!({"text": "OpenAI"})).unwrap();
            report.push(&json!({"text": "Google"})).unwrap();
            report.end_corpus().unwrap();
            report.begin_corpus(Corpus::Article).unwrap();
            report.end_corpus().unwrap();
            report.finish(&json!({"total": 2})).unwrap();
        }

        let value: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["detailed_entities"]["paper"][1]["text"], "Google");
        assert_eq!(value["detailed_entities"]["article"], json!([]));
        assert_eq!(value["statistics"]["total"], 2);
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_push_outside_section_fails() {
        let mut report = ReportWriter::create(Vec::new(), "detailed_entities").unwrap();
        assert!(report.push(&json!(1)).is_err());
    }

    #[test]
    fn test_link_report_writer() {
        let mut buffer = Vec::new();
        {
            let mut report = LinkReportWriter::create(&mut buffer).unwrap();
            report.push(&json!({"query_doc_id": "a1"})).unwrap();
            report
                .finish(&json!({"total_relations": 1, "average_similarity": 0.4}))
                .unwrap();
        }

        let value: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["document_relations"][0]["query_doc_id"], "a1");
        assert_eq!(value["statistics"]["total_relations"], 1);
    }
}
