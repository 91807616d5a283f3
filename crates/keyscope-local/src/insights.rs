//! Placeholder insights.
//!
//! Competitor keywords, trend series and suggestions are fixed sample data. They exist so the
//! UI has something to render; swap in a real `InsightsProvider` to replace them.

use keyscope_core::{FrequencyEntry, Insights, InsightsProvider, Result, TrendPoint};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct StaticInsights;

impl StaticInsights {
    pub fn sample() -> Insights {
        Insights {
            competitor_keywords: vec!["competitor1".to_string(), "competitor2".to_string()],
            google_trends: BTreeMap::from([(
                "SEO".to_string(),
                vec![
                    TrendPoint {
                        date: "2025-01-01".to_string(),
                        value: 50,
                    },
                    TrendPoint {
                        date: "2025-01-02".to_string(),
                        value: 60,
                    },
                ],
            )]),
            ai_suggestions: vec![
                "Add structured data".to_string(),
                "Improve page speed".to_string(),
            ],
        }
    }
}

#[async_trait::async_trait]
impl InsightsProvider for StaticInsights {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn insights(&self, _url: &str, _terms: &[FrequencyEntry]) -> Result<Insights> {
        Ok(Self::sample())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_insights_ignore_input() {
        let p = StaticInsights;
        let a = p.insights("https://a.example/", &[]).await.unwrap();
        let b = p
            .insights(
                "https://b.example/",
                &[FrequencyEntry {
                    term: "seo".to_string(),
                    score: 9,
                }],
            )
            .await
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.competitor_keywords, vec!["competitor1", "competitor2"]);
        assert_eq!(a.google_trends["SEO"].len(), 2);
        assert_eq!(p.name(), "static");
    }
}
