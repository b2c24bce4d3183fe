//! The answer prompt and its slot substitution

use faqa_core::ScoredRecord;

/// Template sent to the completion service. `{context}` receives the
/// retrieved records, `{question}` the user's question verbatim.
pub const ANSWER_TEMPLATE: &str = r#"Given the following context and a question, generate an answer based on this context only.
Provide as much information from the "Answer" section in the source document as possible without making many changes.
If the answer is not found in the context, kindly state "I don't know." Do not fabricate an answer.

CONTEXT: {context}

QUESTION: {question}"#;

/// Separator between retrieved records in the context slot
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Prompt template with named `{slot}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fill the slots in one pass.
    ///
    /// Substituted text is never scanned again, so braces inside a question
    /// or an answer come through untouched. Unknown placeholders stay as-is.
    pub fn render(&self, slots: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };

            let name = &after[..close];
            match slots.iter().find(|(slot, _)| *slot == name) {
                Some((_, value)) => out.push_str(value),
                None => out.push_str(&rest[open..open + close + 2]),
            }
            rest = &after[close + 1..];
        }

        out.push_str(rest);
        out
    }

    /// Render the answer prompt from ranked records and the question
    pub fn answer_prompt(&self, records: &[ScoredRecord], question: &str) -> String {
        let context = build_context(records);
        self.render(&[("context", &context), ("question", question)])
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(ANSWER_TEMPLATE)
    }
}

/// Records' page content in rank order
pub fn build_context(records: &[ScoredRecord]) -> String {
    records
        .iter()
        .map(|r| r.record.page_content())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use faqa_core::Record;

    fn scored(row: usize, q: &str, a: &str, score: f32) -> ScoredRecord {
        ScoredRecord {
            record: Record::new(row, q, a),
            score,
        }
    }

    #[test]
    fn test_render_slots() {
        let template = PromptTemplate::new("C={context} Q={question}");
        assert_eq!(
            template.render(&[("context", "ctx"), ("question", "why?")]),
            "C=ctx Q=why?"
        );
    }

    #[test]
    fn test_render_is_single_pass() {
        let template = PromptTemplate::new("{context}|{question}");
        let rendered = template.render(&[("context", "{question}"), ("question", "q {context}")]);
        assert_eq!(rendered, "{question}|q {context}");
    }

    #[test]
    fn test_unknown_and_unclosed_placeholders_kept() {
        let template = PromptTemplate::new("{other} {question} {open");
        assert_eq!(template.render(&[("question", "q")]), "{other} q {open");
    }

    #[test]
    fn test_answer_prompt_layout() {
        let records = vec![
            scored(0, "Do you have JavaScript course?", "Yes", 0.9),
            scored(4, "Do you have Python course?", "No", 0.6),
        ];
        let prompt = PromptTemplate::default().answer_prompt(&records, "Do you have a JavaScript course?");

        assert!(prompt.starts_with("Given the following context and a question"));
        assert!(prompt.contains("kindly state \"I don't know.\""));
        assert!(prompt.contains(
            "CONTEXT: Question: Do you have JavaScript course?\nAnswer: Yes\n\nQuestion: Do you have Python course?\nAnswer: No\n\nQUESTION: Do you have a JavaScript course?"
        ));
        assert!(prompt.ends_with("QUESTION: Do you have a JavaScript course?"));
    }

    #[test]
    fn test_empty_context() {
        let prompt = PromptTemplate::default().answer_prompt(&[], "anything?");
        assert!(prompt.contains("CONTEXT: \n\nQUESTION: anything?"));
    }
}
