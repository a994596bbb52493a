use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub costs: usize,
    pub time_us: u64,
    pub expanded_nodes: usize,
    pub generated_nodes: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Cost {:?} Time(microseconds) {:?} Expanded nodes number: {:?} Generated nodes number: {:?}",
            self.costs, self.time_us, self.expanded_nodes, self.generated_nodes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialize_full_time_range() {
        let stats = Stats {
            time_us: u64::MAX,
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["time_us"], serde_json::json!(u64::MAX));
    }
}
