// GroundX API client module
// Author: kelexine (https://github.com/kelexine)

mod client;

pub use client::GroundxClient;

use crate::cache::{Bucket, Project};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Response from `GET /v1/group`
#[derive(Debug, Deserialize)]
pub struct GroupListResponse {
    #[serde(default)]
    pub groups: Vec<Value>,
}

/// Response from `GET /v1/group/{groupId}`
#[derive(Debug, Deserialize)]
pub struct GroupResponse {
    pub group: Value,
}

/// A group (project) as GroundX returns it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetail {
    #[serde(deserialize_with = "id_string")]
    pub group_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub buckets: Vec<Value>,
}

/// A bucket as GroundX returns it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDetail {
    #[serde(deserialize_with = "id_string")]
    pub bucket_id: String,
    #[serde(default)]
    pub name: String,
}

/// GroundX ids are integers, but some endpoints echo them as strings.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(u64),
        Str(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Int(n) => Ok(n.to_string()),
        RawId::Str(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        RawId::Str(_) => Err(serde::de::Error::custom("empty id")),
    }
}

impl From<GroupDetail> for Project {
    fn from(group: GroupDetail) -> Self {
        Project::new(group.group_id, group.name)
    }
}

/// Convert raw group entries into projects paired with the buckets embedded
/// in the listing, dropping malformed entries.
pub fn parse_groups(groups: Vec<Value>) -> Vec<(Project, Vec<Bucket>)> {
    groups
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<GroupDetail>(raw) {
            Ok(mut group) => {
                let buckets = parse_buckets(&group.group_id, std::mem::take(&mut group.buckets));
                Some((group.into(), buckets))
            }
            Err(e) => {
                warn!("Ignoring malformed GroundX group entry: {}", e);
                None
            }
        })
        .collect()
}

/// Convert raw bucket entries of `project_id`, dropping malformed ones.
pub fn parse_buckets(project_id: &str, buckets: Vec<Value>) -> Vec<Bucket> {
    buckets
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<BucketDetail>(raw) {
            Ok(bucket) => Some(Bucket::new(bucket.bucket_id, bucket.name, project_id)),
            Err(e) => {
                warn!(
                    "Ignoring malformed GroundX bucket entry in project {}: {}",
                    project_id, e
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_groups_accepts_numeric_and_string_ids() {
        let groups = parse_groups(vec![
            json!({"groupId": 101, "name": "Papers"}),
            json!({"groupId": "202", "name": "Specs"}),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.id, "101");
        assert_eq!(groups[1].0.id, "202");
        assert!(groups[0].0.bucket_ids.is_empty());
        assert!(groups[0].1.is_empty());
    }

    #[test]
    fn test_parse_groups_keeps_embedded_buckets() {
        let groups = parse_groups(vec![json!({
            "groupId": 101,
            "name": "Papers",
            "buckets": [{"bucketId": 1, "name": "Physics"}, {"name": "no id"}]
        })]);
        assert_eq!(groups[0].1, vec![Bucket::new("1", "Physics", "101")]);
    }

    #[test]
    fn test_parse_groups_skips_malformed_entries() {
        let groups = parse_groups(vec![
            json!({"name": "No id"}),
            json!({"groupId": "", "name": "Blank id"}),
            json!({"groupId": {"nested": true}}),
            json!("not an object"),
            json!({"groupId": 7}),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0.id, "7");
        assert_eq!(groups[0].0.name, "");
    }

    #[test]
    fn test_parse_buckets_sets_owner() {
        let buckets = parse_buckets(
            "101",
            vec![
                json!({"bucketId": 1, "name": "Physics"}),
                json!({"bucketName": "missing id"}),
            ],
        );
        assert_eq!(buckets, vec![Bucket::new("1", "Physics", "101")]);
    }
}
