//! External collaborators: term-sheet extraction and treasury Q&A
//!
//! Both are capabilities passed in by the caller. Nothing here holds a
//! process-wide client or reads credentials.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{BreakFundingError, Result};
use crate::loan::RawLoanTerms;

/// Loan fields the extraction service is asked for, in prompt order
pub const EXTRACTED_FIELDS: [&str; 6] = [
    "Effective Date",
    "Maturity Date",
    "Frequency",
    "Amortization Type",
    "Loan Rate",
    "Balance",
];

/// Normalize a field label to its key ("Loan Rate" -> "loan_rate")
pub fn normalize_key(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "_")
}

/// Chat-completion capability (a hosted language model in production)
pub trait ChatService: Send + Sync {
    fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}

/// Pulls loan terms out of a document's text
pub trait TermExtractor: Send + Sync {
    fn extract(&self, document_text: &str) -> Result<ExtractedTerms>;
}

/// Extracted field values and the excerpts supporting them, keyed by normalized name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTerms {
    pub fields: BTreeMap<String, String>,
    pub quotes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ModelField {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    quote: String,
}

impl ExtractedTerms {
    /// All known fields present with empty values and quotes
    pub fn blank() -> Self {
        let keys = EXTRACTED_FIELDS.iter().map(|f| normalize_key(f));
        Self {
            fields: keys.clone().map(|k| (k, String::new())).collect(),
            quotes: keys.map(|k| (k, String::new())).collect(),
        }
    }

    /// Parse the JSON array of `{key, value, quote}` objects embedded in a model reply
    ///
    /// Text before the first `[` and after the last `]` is ignored.
    pub fn from_model_response(content: &str) -> Result<Self> {
        let (start, end) = match (content.find('['), content.rfind(']')) {
            (Some(start), Some(end)) if start < end => (start, end),
            _ => {
                return Err(BreakFundingError::Service(
                    "JSON array not found in model response".to_string(),
                ))
            }
        };

        let entries: Vec<ModelField> = serde_json::from_str(&content[start..=end])
            .map_err(|e| BreakFundingError::Service(format!("Malformed extraction JSON: {}", e)))?;

        let mut terms = Self::default();
        for entry in entries {
            let key = normalize_key(&entry.key);
            let value = match entry.value {
                serde_json::Value::String(s) => s.trim().to_string(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            terms.fields.insert(key.clone(), value);
            terms.quotes.insert(key, entry.quote.trim().to_string());
        }
        Ok(terms)
    }

    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn quote(&self, key: &str) -> &str {
        self.quotes.get(key).map(String::as_str).unwrap_or("")
    }

    /// Combine extracted terms with the user's prepayment inputs
    pub fn to_raw_terms(&self, prepayment_date: &str, prepayment_amount: &str) -> RawLoanTerms {
        RawLoanTerms {
            effective_date: self.field("effective_date").to_string(),
            maturity_date: self.field("maturity_date").to_string(),
            frequency: self.field("frequency").to_string(),
            amortization_type: self.field("amortization_type").to_string(),
            loan_rate: self.field("loan_rate").to_string(),
            balance: self.field("balance").to_string(),
            prepayment_date: prepayment_date.to_string(),
            prepayment_amount: prepayment_amount.to_string(),
        }
    }
}

const EXTRACTION_SYSTEM_PROMPT: &str = "You extract financial data from loan term sheets. \
For each requested loan term give its value and a quote copied verbatim from the text showing where the value came from.";

/// Term extractor backed by a chat model
pub struct ModelTermExtractor<C: ChatService> {
    chat: C,
}

impl<C: ChatService> ModelTermExtractor<C> {
    pub fn new(chat: C) -> Self {
        Self { chat }
    }

    fn user_prompt(document_text: &str) -> String {
        format!(
            "Extract these fields from the text: {fields}.\n\
             Reply with a JSON array of objects with double-quoted keys \"key\", \"value\" and \"quote\".\n\
             Dates as MM/DD/YYYY. Frequency is one of monthly, quarterly, semiannual, annual. \
             Amortization Type is one of interest only, equal, linear, custom. \
             Loan Rate is a percentage number without the percent sign. Balance is a number without currency.\n\n\
             Text:\n\"\"\"{text}\"\"\"",
            fields = EXTRACTED_FIELDS.join(", "),
            text = document_text
        )
    }
}

impl<C: ChatService> TermExtractor for ModelTermExtractor<C> {
    fn extract(&self, document_text: &str) -> Result<ExtractedTerms> {
        let reply = self
            .chat
            .complete(EXTRACTION_SYSTEM_PROMPT, &Self::user_prompt(document_text))?;
        ExtractedTerms::from_model_response(&reply)
    }
}

/// Run the extractor, falling back to blank fields when it fails
pub fn extract_or_blank(extractor: &dyn TermExtractor, document_text: &str) -> ExtractedTerms {
    match extractor.extract(document_text) {
        Ok(terms) => terms,
        Err(e) => {
            log::warn!("Term extraction failed, returning blank terms: {}", e);
            ExtractedTerms::blank()
        }
    }
}

/// Format an amount as `$1,234.56`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

const OFF_TOPIC_KEYWORDS: &[&str] = &["car", "color", "colour", "weather"];
const IMPACT_KEYWORDS: &[&str] = &["impact", "cost", "effect", "calculate", "calculation", "savings", "reduction"];
const BREAK_FUNDING_KEYWORDS: &[&str] = &[
    "break-funding",
    "break funding",
    "break cost",
    "prepay penalty",
    "breakfund",
    "break-fund",
    "break fund",
];
const FTP_KEYWORDS: &[&str] = &["ftp", "fund transfer pricing", "transfer price", "transfer pricing"];

pub const OFF_TOPIC_REPLY: &str = "I answer questions on bank treasury topics such as break-funding and fund transfer pricing. \
That question is outside this area, so I cannot help with it.";

pub const IMPACT_REPLY: &str = "The calculation splits the loan's cash flows at the prepayment date. \
The prepayment retires principal starting from the last scheduled period and working backward, producing prepaid principal cash flows. \
Both the original and the adjusted schedules are discounted to the prepayment date, and the difference between their present values is the cost of prepaying. ";

pub const BREAK_FUNDING_REPLY: &str = "Break-funding is the cost a bank bears when a fixed-rate loan is repaid before maturity. \
The prepaid funds have to be reinvested at current market rates, which may be lower than the rate the loan was funded at.";

pub const FTP_REPLY: &str = "FTP stands for Fund Transfer Pricing, the internal mechanism a bank uses to charge business units for the funds they use \
and credit them for the funds they provide, keeping pricing transparent and interest-rate and liquidity risk with treasury.";

pub const FALLBACK_REPLY: &str = "Sorry, there was a problem generating a response.";

const ASSISTANT_SYSTEM_PROMPT: &str = "You are an expert in bank treasury finance answering questions on break-funding \
and fund transfer pricing. Answer concisely. If you are not sure, say so.";

/// Keyword-routed treasury Q&A with a chat-model fallback
pub struct TreasuryAssistant<C: ChatService> {
    chat: C,
}

impl<C: ChatService> TreasuryAssistant<C> {
    pub fn new(chat: C) -> Self {
        Self { chat }
    }

    /// Answer `question`, mentioning `break_funding_cost` when the question is about impact
    pub fn reply(&self, question: &str, break_funding_cost: Option<f64>) -> String {
        let text = question.trim().to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|kw| text.contains(kw));

        if mentions(OFF_TOPIC_KEYWORDS) {
            OFF_TOPIC_REPLY.to_string()
        } else if mentions(IMPACT_KEYWORDS) {
            match break_funding_cost {
                Some(cost) => format!(
                    "{}The total impact of the prepayment on the loan's cost is {}.",
                    IMPACT_REPLY,
                    format_currency(cost)
                ),
                None => IMPACT_REPLY.to_string(),
            }
        } else if mentions(BREAK_FUNDING_KEYWORDS) {
            BREAK_FUNDING_REPLY.to_string()
        } else if mentions(FTP_KEYWORDS) {
            FTP_REPLY.to_string()
        } else {
            let message = format!("My question is: {}", question);
            match self.chat.complete(ASSISTANT_SYSTEM_PROMPT, &message) {
                Ok(answer) => answer.trim().to_string(),
                Err(e) => {
                    log::warn!("Chat completion failed: {}", e);
                    FALLBACK_REPLY.to_string()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Canned chat service recording the last message it saw
    struct ScriptedChat {
        reply: Result<String>,
        last_message: Mutex<Option<String>>,
    }

    impl ScriptedChat {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                last_message: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(BreakFundingError::Service("timeout".to_string())),
                last_message: Mutex::new(None),
            }
        }
    }

    impl ChatService for ScriptedChat {
        fn complete(&self, _system_prompt: &str, user_message: &str) -> Result<String> {
            *self.last_message.lock().unwrap() = Some(user_message.to_string());
            match &self.reply {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(BreakFundingError::Service(e.to_string())),
            }
        }
    }

    /// Term sheet fixture standing in for the extraction service
    struct SampleTermSheet;

    impl TermExtractor for SampleTermSheet {
        fn extract(&self, _document_text: &str) -> Result<ExtractedTerms> {
            ExtractedTerms::from_model_response(
                r#"[
                {"key": "Effective Date", "value": "07/09/2009", "quote": "Issue Date: 9 July 2009 (Settlement Date)"},
                {"key": "Maturity Date", "value": "07/09/2013", "quote": "Maturity Date: 9 July 2013"},
                {"key": "Frequency", "value": "quarterly", "quote": "The 9th of each January, April, July, and October"},
                {"key": "Amortization Type", "value": "equal", "quote": "fixed rate of 3.40% per annum"},
                {"key": "Loan Rate", "value": "3.40", "quote": "fixed rate of 3.40% per annum"},
                {"key": "Balance", "value": "4500000", "quote": "Net Proceeds: USD 4,500,000"}
            ]"#,
            )
        }
    }

    struct BrokenExtractor;

    impl TermExtractor for BrokenExtractor {
        fn extract(&self, _document_text: &str) -> Result<ExtractedTerms> {
            Err(BreakFundingError::Service("document unreadable".to_string()))
        }
    }

    #[test]
    fn test_parse_model_response_with_chatter() {
        let reply = "Sure! Here are the fields:\n[{\"key\": \"Loan Rate\", \"value\": \" 3.40 \", \"quote\": \"3.40% per annum\"},\
                     {\"key\": \"Balance\", \"value\": 4500000, \"quote\": \"USD 4,500,000\"}]\nLet me know.";
        let terms = ExtractedTerms::from_model_response(reply).unwrap();
        assert_eq!(terms.field("loan_rate"), "3.40");
        assert_eq!(terms.field("balance"), "4500000");
        assert_eq!(terms.quote("balance"), "USD 4,500,000");
        assert_eq!(terms.field("frequency"), "");
    }

    #[test]
    fn test_parse_model_response_without_array() {
        assert!(matches!(
            ExtractedTerms::from_model_response("I could not find any terms."),
            Err(BreakFundingError::Service(_))
        ));
        assert!(ExtractedTerms::from_model_response("[not json]").is_err());
    }

    #[test]
    fn test_fixture_terms_parse_into_loan() {
        let extracted = SampleTermSheet.extract("").unwrap();
        let terms = extracted.to_raw_terms("2011-07-09", "1000000").parse().unwrap();
        assert_eq!(terms.effective_date.to_string(), "2009-07-09");
        assert!((terms.annual_rate - 3.40).abs() < 1e-12);
    }

    #[test]
    fn test_extract_or_blank() {
        let blank = extract_or_blank(&BrokenExtractor, "text");
        assert_eq!(blank, ExtractedTerms::blank());
        assert_eq!(blank.fields.len(), 6);
        assert!(blank.fields.contains_key("amortization_type"));

        let extracted = extract_or_blank(&SampleTermSheet, "text");
        assert_eq!(extracted.field("frequency"), "quarterly");
    }

    #[test]
    fn test_model_term_extractor_prompts_with_document() {
        let extractor = ModelTermExtractor::new(ScriptedChat::replying(
            "[{\"key\": \"Frequency\", \"value\": \"annual\", \"quote\": \"paid annually\"}]",
        ));
        let terms = extractor.extract("The notes pay interest annually.").unwrap();
        assert_eq!(terms.field("frequency"), "annual");

        let prompt = extractor.chat.last_message.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Amortization Type"));
        assert!(prompt.contains("The notes pay interest annually."));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1_234.567), "$1,234.57");
        assert_eq!(format_currency(4_500_000.0), "$4,500,000.00");
        assert_eq!(format_currency(-12_345.6), "-$12,345.60");
    }

    #[test]
    fn test_assistant_routing() {
        let assistant = TreasuryAssistant::new(ScriptedChat::replying("  unused  "));

        assert_eq!(assistant.reply("What colour is the sky?", None), OFF_TOPIC_REPLY);
        assert_eq!(assistant.reply("What is break funding?", None), BREAK_FUNDING_REPLY);
        assert_eq!(assistant.reply("Explain FTP please", None), FTP_REPLY);
        assert_eq!(assistant.reply("What is the impact?", None), IMPACT_REPLY);

        let with_cost = assistant.reply("How much does it cost?", Some(12_345.678));
        assert!(with_cost.starts_with(IMPACT_REPLY));
        assert!(with_cost.ends_with("is $12,345.68."));

        // Nothing recognized: the chat service answers
        assert!(assistant.chat.last_message.lock().unwrap().is_none());
        assert_eq!(assistant.reply("Who sets the base rate?", None), "unused");
        assert_eq!(
            assistant.chat.last_message.lock().unwrap().as_deref(),
            Some("My question is: Who sets the base rate?")
        );
    }

    #[test]
    fn test_assistant_fallback_on_failure() {
        let assistant = TreasuryAssistant::new(ScriptedChat::failing());
        assert_eq!(assistant.reply("Who sets the base rate?", None), FALLBACK_REPLY);
    }
}
