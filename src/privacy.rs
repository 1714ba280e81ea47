// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Anonymisation and data export

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::UserData;
use crate::Result;

/// Metrics that carry no identifying information
const SAFE_KEYS: [&str; 8] = [
    "mood_score",
    "stress_level",
    "sleep_quality",
    "sleep_hours",
    "avg_heart_rate",
    "steps",
    "deep_sleep_percentage",
    "rem_sleep_percentage",
];

const ANONYMIZED_ID_LEN: usize = 12;

/// Strip a record down to non-identifying metrics.
///
/// Records with a `date` get a random `anonymized_id` so rows stay distinct
/// without being linkable back to the user.
pub fn anonymize<T: Serialize, R: Rng + ?Sized>(record: &T, rng: &mut R) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(record)?;
    let Value::Object(fields) = value else {
        return Ok(Map::new());
    };

    let mut safe: Map<String, Value> = SAFE_KEYS
        .iter()
        .filter_map(|k| fields.get(*k).map(|v| (k.to_string(), v.clone())))
        .collect();

    if let Some(date) = fields.get("date") {
        let salt: [u8; 8] = rng.gen();
        let mut hasher = blake3::Hasher::new();
        hasher.update(date.to_string().as_bytes());
        hasher.update(&salt);
        let hex = hasher.finalize().to_hex();
        safe.insert(
            "anonymized_id".to_string(),
            Value::String(hex[..ANONYMIZED_ID_LEN].to_string()),
        );
    }

    Ok(safe)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportCategory {
    pub category: String,
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataExport {
    pub export_date: NaiveDate,
    pub data_categories: Vec<ExportCategory>,
}

fn to_items<T: Serialize>(items: &[T]) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(Into::into))
        .collect()
}

/// Everything stored for a user, grouped by category.
///
/// Derived journal sentiment is only included when `include_sensitive` is set.
pub fn create_data_export(data: &UserData, include_sensitive: bool, export_date: NaiveDate) -> Result<DataExport> {
    let mut journal = to_items(&data.journal_entries)?;
    if !include_sensitive {
        for entry in &mut journal {
            if let Some(fields) = entry.as_object_mut() {
                fields.remove("sentiment");
            }
        }
    }

    Ok(DataExport {
        export_date,
        data_categories: vec![
            ExportCategory {
                category: "Journal Entries".to_string(),
                items: journal,
            },
            ExportCategory {
                category: "Wearable Health Data".to_string(),
                items: to_items(&data.wearable_data)?,
            },
            ExportCategory {
                category: "Coping Strategies".to_string(),
                items: to_items(&data.coping_strategies)?,
            },
        ],
    })
}

pub fn privacy_summary() -> &'static str {
    "# NeuroSync Privacy Information\n\n\
     ## Data Storage\n\
     - Journal entries are held in memory by your own NeuroSync server\n\
     - All sensitive data is processed locally on your device\n\
     - Raw wearable data is never transmitted to external servers\n\n\
     ## Data Usage\n\
     - Your data is used only to provide personalized insights to you\n\
     - No data is shared with third parties\n\
     - Journal text is only sent to a language model when you configure an API key\n\n\
     ## Your Rights\n\
     - You can export all your data at any time\n\
     - You can delete your data completely from our systems\n\
     - You control what wearable metrics are imported and analyzed\n\n\
     ## Anonymized Research\n\
     - If you opt in, strictly anonymized data may be used for mental health research\n\
     - No journal text or personally identifiable information is ever included\n\
     - You can opt out at any time through settings\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::process_journal_entry;
    use crate::journal::tests::input;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_anonymize_journal_entry() {
        let entry = process_journal_entry(input("2024-03-10", "Met Alice for lunch", 7, 3)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let safe = anonymize(&entry, &mut rng).unwrap();

        assert_eq!(safe["mood_score"], 7);
        assert_eq!(safe["sleep_quality"], 6);
        assert!(safe.get("content").is_none());
        assert!(safe.get("title").is_none());
        assert!(safe.get("id").is_none());

        let id = safe["anonymized_id"].as_str().unwrap();
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_anonymized_ids_are_salted() {
        let record = serde_json::json!({ "date": "2024-03-10", "steps": 4000 });
        let mut rng = StdRng::seed_from_u64(1);
        let a = anonymize(&record, &mut rng).unwrap();
        let b = anonymize(&record, &mut rng).unwrap();
        assert_ne!(a["anonymized_id"], b["anonymized_id"]);
    }

    #[test]
    fn test_undated_record_has_no_id() {
        let record = serde_json::json!({ "email": "a@b.c", "steps": 4000 });
        let safe = anonymize(&record, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(safe.len(), 1);
        assert_eq!(safe["steps"], 4000);
    }

    #[test]
    fn test_export_strips_sentiment_unless_sensitive() {
        let mut data = UserData::new(day("2024-03-10"));
        data.journal_entries
            .push(process_journal_entry(input("2024-03-10", "Good day", 8, 2)).unwrap());

        let export = create_data_export(&data, false, day("2024-03-11")).unwrap();
        let categories: Vec<&str> = export.data_categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(categories, ["Journal Entries", "Wearable Health Data", "Coping Strategies"]);
        assert!(export.data_categories[0].items[0].get("sentiment").is_none());
        assert_eq!(export.data_categories[2].items.len(), 1);

        let sensitive = create_data_export(&data, true, day("2024-03-11")).unwrap();
        assert!(sensitive.data_categories[0].items[0].get("sentiment").is_some());
    }

    #[test]
    fn test_summary_sections() {
        let summary = privacy_summary();
        for heading in ["## Data Storage", "## Data Usage", "## Your Rights", "## Anonymized Research"] {
            assert!(summary.contains(heading));
        }
    }
}
