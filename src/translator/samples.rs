use std::fmt;

use crate::{
    renderer::{QueryArtifact, Target},
    translator::{TranslateError, Translator},
};

/// A canned example request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRequest {
    pub description: &'static str,
    pub request: &'static str,
}

pub const SAMPLE_REQUESTS: &[SampleRequest] = &[
    SampleRequest {
        description: "Total sales by product category",
        request: "show total sales_amount by product_category from sales",
    },
    SampleRequest {
        description: "Count of employees by department where count exceeds 10",
        request: "show department from employees having more than 10 employee_id",
    },
    SampleRequest {
        description: "Retrieve top 5 products by total sales",
        request: "top 5 product_name total sales from products by product_name sorted by total sales desc",
    },
];

/// A sample request together with its translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub description: String,
    pub query: QueryArtifact,
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\nQuery:\n{}", self.description, self.query)
    }
}

pub struct SampleCatalog;

impl SampleCatalog {
    /// Recognize a "show me sample queries for mysql/mongodb" message.
    pub fn detect(message: &str) -> Option<Target> {
        let message = message.to_lowercase();
        if !message.contains("sample") || !message.contains("queries") {
            return None;
        }

        if message.contains("mongo") {
            Some(Target::Document)
        } else if message.contains("sql") {
            Some(Target::Sql)
        } else {
            None
        }
    }

    /// Every sample, translated for `target`. The requests all name their
    /// table, so the translator's active source is never consulted.
    pub fn samples(translator: &Translator, target: Target) -> Result<Vec<Sample>, TranslateError> {
        SAMPLE_REQUESTS
            .iter()
            .map(|sample| {
                Ok(Sample {
                    description: sample.description.to_string(),
                    query: translator.translate(sample.request, target)?,
                })
            })
            .collect()
    }

    /// Samples for a chat message, if it asks for them.
    pub fn answer(translator: &Translator, message: &str) -> Option<Result<Vec<Sample>, TranslateError>> {
        let target = Self::detect(message)?;
        tracing::debug!(%target, "sample queries requested");
        Some(Self::samples(translator, target))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        renderer::Target,
        translator::{SampleCatalog, Translator},
    };

    #[test]
    pub fn test_detect() {
        assert_eq!(SampleCatalog::detect("Give me sample queries for MySQL"), Some(Target::Sql));
        assert_eq!(SampleCatalog::detect("sample queries in sql please"), Some(Target::Sql));
        assert_eq!(SampleCatalog::detect("any sample queries for mongodb?"), Some(Target::Document));
        assert_eq!(SampleCatalog::detect("sample queries for Mongo"), Some(Target::Document));
        assert_eq!(SampleCatalog::detect("sample queries"), None);
        assert_eq!(SampleCatalog::detect("show total sales from sql_logs"), None);
    }

    #[test]
    pub fn test_sql_samples() {
        let samples = SampleCatalog::samples(&Translator::default(), Target::Sql).expect("samples");
        let queries: Vec<String> = samples.iter().map(|s| s.query.to_string()).collect();

        assert_eq!(
            queries,
            vec![
                "SELECT product_category, SUM(sales_amount) FROM sales GROUP BY product_category",
                "SELECT department, COUNT(employee_id) AS count FROM employees GROUP BY department HAVING COUNT(employee_id) > 10",
                "SELECT product_name, SUM(sales) FROM products GROUP BY product_name ORDER BY SUM(sales) DESC LIMIT 5",
            ]
        );
    }

    #[test]
    pub fn test_document_samples() {
        let samples = SampleCatalog::samples(&Translator::default(), Target::Document).expect("samples");
        let first = samples[0].query.as_pipeline().expect("pipeline");

        assert_eq!(first.collection, "sales");
        assert_eq!(
            first.pipeline,
            vec![json!({"$group": {"_id": "$product_category", "total": {"$sum": "$sales_amount"}}})]
        );

        let top = samples[2].query.as_pipeline().expect("pipeline");
        assert_eq!(top.stage_names(), vec!["$group", "$sort", "$limit"]);
        assert_eq!(top.stage("$sort"), Some(&json!({"total": -1})));
    }

    #[test]
    pub fn test_sample_display() {
        let samples = SampleCatalog::samples(&Translator::default(), Target::Sql).expect("samples");
        assert_eq!(
            samples[0].to_string(),
            "Total sales by product category\nQuery:\nSELECT product_category, SUM(sales_amount) FROM sales GROUP BY product_category"
        );
    }

    #[test]
    pub fn test_answer_ignores_other_messages() {
        assert!(SampleCatalog::answer(&Translator::default(), "show name from people").is_none());
        let answer = SampleCatalog::answer(&Translator::default(), "sample queries for mysql").expect("detected");
        assert_eq!(answer.expect("samples").len(), 3);
    }
}
