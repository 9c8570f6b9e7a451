use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub requests: usize,
    pub found: usize,
    pub not_found: usize,
    pub cancelled: usize,
    pub expanded_nodes: usize,
    pub advance_calls: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Requests {:?} Found {:?} Not found {:?} Cancelled {:?} Expanded nodes {:?} Advance calls {:?}",
            self.requests,
            self.found,
            self.not_found,
            self.cancelled,
            self.expanded_nodes,
            self.advance_calls
        );
    }
}
