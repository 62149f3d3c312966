use std::fs;

use log::debug;
use snafu::prelude::*;

use crate::election::*;

/// Where an election description is kept between runs.
pub trait ElectionStore {
    fn load(&self) -> ElectionResult<ElectionConfig>;
    fn save(&self, config: &ElectionConfig) -> ElectionResult<()>;
}

/// Election descriptions stored as pretty-printed JSON files.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct JsonFileStore {
    path: String,
}

impl JsonFileStore {
    pub fn new(path: &str) -> JsonFileStore {
        JsonFileStore {
            path: path.to_string(),
        }
    }
}

impl ElectionStore for JsonFileStore {
    fn load(&self) -> ElectionResult<ElectionConfig> {
        debug!("JsonFileStore: loading {:?}", self.path);
        let contents = fs::read_to_string(&self.path).context(OpeningJsonSnafu { path: &self.path })?;
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
    }

    fn save(&self, config: &ElectionConfig) -> ElectionResult<()> {
        debug!("JsonFileStore: saving {:?}", self.path);
        let js = serde_json::to_string_pretty(config).context(ParsingJsonSnafu {})?;
        fs::write(&self.path, js).context(WritingJsonSnafu { path: &self.path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn save_and_load() {
        let config: ElectionConfig = serde_json::from_value(json!({
            "outputSettings": { "electionName": "Stored", "electionDate": "2026-08-01" },
            "rules": { "thresholdPercent": 5, "bonusSeat": true },
            "districts": [
                { "id": "D1", "name": "Alpha", "seatCount": 3, "totalVotes": 100, "rejectedVotes": 2 }
            ],
            "parties": [
                { "id": "a", "name": "A", "districtId": "D1", "votes": 98 }
            ]
        }))
        .unwrap();
        let path = std::env::temp_dir().join(format!("seatcalc-store-{}.json", std::process::id()));
        let store = JsonFileStore::new(&path.display().to_string());
        store.save(&config).unwrap();
        let loaded = store.load().unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file() {
        let store = JsonFileStore::new("no_such_election.json");
        assert!(matches!(
            store.load(),
            Err(ElectionError::OpeningJson { .. })
        ));
    }
}
