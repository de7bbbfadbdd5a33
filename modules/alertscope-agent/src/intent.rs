use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What the parse stage extracted from the user's question. Produced
/// once, consumed by both fetch stages — neither stage re-reads the raw
/// query text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QueryIntent {
    /// Trader the question is about, if any.
    pub trader_name: Option<String>,
    /// Specific alert identifier the question names, if any.
    pub alert_id: Option<String>,
    /// Misconduct-type tags of interest (spoofing, wash_trading,
    /// layering, front_running).
    #[serde(default)]
    pub misconduct_types: Vec<String>,
    /// Asset symbols the question mentions.
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Whether the question asks for market data.
    #[serde(default)]
    pub wants_market_data: bool,
}

impl QueryIntent {
    /// Keyword fallback used when structured extraction is unavailable.
    /// Trigger phrases only; best effort by design.
    pub fn from_keywords(query: &str) -> Self {
        let lowered = query.to_lowercase();

        let mut misconduct_types = Vec::new();
        if lowered.contains("spoofing") {
            misconduct_types.push("spoofing".to_string());
        }
        if lowered.contains("wash trading") || lowered.contains("wash_trading") {
            misconduct_types.push("wash_trading".to_string());
        }
        if lowered.contains("layering") {
            misconduct_types.push("layering".to_string());
        }
        if lowered.contains("front running")
            || lowered.contains("front-running")
            || lowered.contains("front_running")
        {
            misconduct_types.push("front_running".to_string());
        }

        Self {
            trader_name: extract_trader_name(query),
            alert_id: None,
            misconduct_types,
            symbols: Vec::new(),
            wants_market_data: lowered.contains("market data"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trader_name.is_none()
            && self.alert_id.is_none()
            && self.misconduct_types.is_empty()
            && self.symbols.is_empty()
            && !self.wants_market_data
    }
}

/// Take the capitalized words following the word "trader" as a name.
fn extract_trader_name(query: &str) -> Option<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    let pos = words
        .iter()
        .position(|w| w.eq_ignore_ascii_case("trader"))?;

    let name: Vec<&str> = words[pos + 1..]
        .iter()
        .take_while(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
        .take(3)
        .copied()
        .collect();

    if name.is_empty() {
        None
    } else {
        Some(
            name.join(" ")
                .trim_end_matches(['.', ',', '?', '!'])
                .to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spoofing_trigger_phrase() {
        let intent = QueryIntent::from_keywords("Show me all spoofing alerts from last week");
        assert_eq!(intent.misconduct_types, vec!["spoofing"]);
        assert!(intent.trader_name.is_none());
    }

    #[test]
    fn wash_trading_with_space_or_underscore() {
        let intent = QueryIntent::from_keywords("any wash trading lately?");
        assert_eq!(intent.misconduct_types, vec!["wash_trading"]);
        let intent = QueryIntent::from_keywords("wash_trading alerts");
        assert_eq!(intent.misconduct_types, vec!["wash_trading"]);
    }

    #[test]
    fn trader_name_follows_the_trader_token() {
        let intent = QueryIntent::from_keywords("Get all alerts for trader Bill Lyons");
        assert_eq!(intent.trader_name.as_deref(), Some("Bill Lyons"));
    }

    #[test]
    fn trader_name_stops_at_lowercase_words() {
        let intent = QueryIntent::from_keywords("did trader Bill Lyons cancel orders today");
        assert_eq!(intent.trader_name.as_deref(), Some("Bill Lyons"));
    }

    #[test]
    fn trailing_punctuation_is_stripped() {
        let intent = QueryIntent::from_keywords("What about trader Ada?");
        assert_eq!(intent.trader_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn no_triggers_yields_empty_intent() {
        let intent = QueryIntent::from_keywords("what are the latest surveillance concerns?");
        assert!(intent.is_empty());
    }

    #[test]
    fn multiple_types_accumulate() {
        let intent = QueryIntent::from_keywords("compare spoofing and layering volumes");
        assert_eq!(intent.misconduct_types, vec!["spoofing", "layering"]);
    }

    #[test]
    fn intent_deserializes_from_extraction_output() {
        let raw = r#"{
            "trader_name": "Bill Lyons",
            "alert_id": null,
            "misconduct_types": ["spoofing"],
            "symbols": ["AAPL"],
            "wants_market_data": true
        }"#;
        let intent: QueryIntent = serde_json::from_str(raw).unwrap();
        assert_eq!(intent.trader_name.as_deref(), Some("Bill Lyons"));
        assert_eq!(intent.symbols, vec!["AAPL"]);
        assert!(intent.wants_market_data);
    }
}
