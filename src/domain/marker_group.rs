use crate::domain::{GeoEntry, GeoPoint};

/// Entries drawn as one marker. The first member is the anchor every other member was measured against.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerGroup {
    anchor: GeoPoint,
    members: Vec<GeoEntry>,
}

impl MarkerGroup {
    pub fn new(representative: GeoEntry, anchor: GeoPoint) -> Self {
        MarkerGroup {
            anchor,
            members: vec![representative],
        }
    }

    pub(crate) fn push(&mut self, entry: GeoEntry) {
        self.members.push(entry);
    }

    pub fn anchor(&self) -> GeoPoint {
        self.anchor
    }

    pub fn representative(&self) -> &GeoEntry {
        // Never empty, `new` seeds the first member
        &self.members[0]
    }

    pub fn members(&self) -> &[GeoEntry] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_cluster(&self) -> bool {
        self.members.len() > 1
    }

    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|member| member.id.clone()).collect()
    }
}
