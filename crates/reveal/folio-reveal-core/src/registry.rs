//! Watched-element registry.
//!
//! Built once at page init: every observed group and the members it reveals,
//! each tagged with its reveal category. Element keys are opaque host handles
//! (a DOM adapter uses a data attribute or selector path).

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::RevealError;
use crate::ids::{GroupId, IdAllocator};

/// Opaque host element handle (small string key).
pub type ElementKey = String;

/// What an observed group is; selects its threshold, start delay and stagger.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Metrics ticker / terminal metrics / project metric boxes.
    Metrics,
    /// A single achievement, project or experience card.
    Fade,
    /// A project visualization container.
    Chart,
    /// An `<img data-src>` waiting to load.
    LazyImage,
    /// Terminal command lines typed at page load.
    Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Fire on the first qualifying viewport intersection.
    Visible,
    /// Fire on the engine's first update.
    Load,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub kind: GroupKind,
    pub trigger: Trigger,
}

impl GroupSpec {
    /// Group with the trigger its kind uses on the page.
    pub fn new(kind: GroupKind) -> Self {
        let trigger = match kind {
            GroupKind::Commands => Trigger::Load,
            _ => Trigger::Visible,
        };
        Self { kind, trigger }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartPart {
    StrategyLine,
    AlgoNode,
    CodeLine,
}

/// Reveal category with the attributes captured at registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RevealKind {
    /// Terminal count-up; `target` is the raw attribute text.
    Counter {
        target: String,
        #[serde(default)]
        prefix: String,
        #[serde(default)]
        suffix: String,
    },
    /// Ticker count-up; a `+` in `original_text` is kept after the number.
    TickerMetric {
        target: String,
        #[serde(default)]
        original_text: String,
    },
    TypedText {
        text: String,
    },
    FadeCard,
    ChartNode {
        part: ChartPart,
    },
    LazyImage {
        src: String,
    },
}

impl RevealKind {
    /// Stagger bucket: members only stagger against siblings of the same category.
    fn category(&self) -> u8 {
        match self {
            RevealKind::Counter { .. } => 0,
            RevealKind::TickerMetric { .. } => 1,
            RevealKind::TypedText { .. } => 2,
            RevealKind::FadeCard => 3,
            RevealKind::ChartNode { part } => 4 + *part as u8,
            RevealKind::LazyImage { .. } => 7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub key: ElementKey,
    pub kind: RevealKind,
    /// Index among same-category siblings in the group.
    pub index: usize,
}

#[derive(Clone, Debug)]
pub struct GroupEntry {
    pub id: GroupId,
    pub spec: GroupSpec,
    pub members: Vec<Member>,
}

/// Immutable registry handed to the engine.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    groups: Vec<GroupEntry>,
    by_key: HashMap<ElementKey, GroupId>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn group(&self, id: GroupId) -> Option<&GroupEntry> {
        self.groups.get(id.0 as usize).filter(|g| g.id == id)
    }

    /// Group that reveals the given element.
    pub fn group_of(&self, key: &str) -> Option<GroupId> {
        self.by_key.get(key).copied()
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupEntry> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Build from a page description:
    /// `{ "groups": [{ "kind": "metrics", "members": [{ "key": "...", "reveal": {..} }] }] }`.
    pub fn from_page_json(s: &str) -> Result<Self, RevealError> {
        let page: PageSpec = serde_json::from_str(s)?;
        let mut builder = RegistryBuilder::default();
        for decl in page.groups {
            let mut spec = GroupSpec::new(decl.kind);
            if let Some(trigger) = decl.trigger {
                spec.trigger = trigger;
            }
            let gid = builder.group(spec);
            for m in decl.members {
                match m.index {
                    Some(index) => builder.member_at(gid, m.key, m.reveal, index)?,
                    None => builder.member(gid, m.key, m.reveal)?,
                }
            }
        }
        Ok(builder.build())
    }
}

#[derive(Debug, Deserialize)]
struct PageSpec {
    #[serde(default)]
    groups: Vec<GroupDecl>,
}

#[derive(Debug, Deserialize)]
struct GroupDecl {
    kind: GroupKind,
    #[serde(default)]
    trigger: Option<Trigger>,
    #[serde(default)]
    members: Vec<MemberDecl>,
}

#[derive(Debug, Deserialize)]
struct MemberDecl {
    key: ElementKey,
    reveal: RevealKind,
    #[serde(default)]
    index: Option<usize>,
}

#[derive(Default, Debug)]
pub struct RegistryBuilder {
    ids: IdAllocator,
    groups: Vec<GroupEntry>,
    by_key: HashMap<ElementKey, GroupId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observed group.
    pub fn group(&mut self, spec: GroupSpec) -> GroupId {
        let id = self.ids.alloc_group();
        self.groups.push(GroupEntry {
            id,
            spec,
            members: Vec::new(),
        });
        id
    }

    /// Add a member; its sibling index is the count of same-category members so far.
    pub fn member(
        &mut self,
        group: GroupId,
        key: impl Into<ElementKey>,
        kind: RevealKind,
    ) -> Result<(), RevealError> {
        let entry = self
            .groups
            .get(group.0 as usize)
            .ok_or(RevealError::UnknownGroup(group))?;
        let cat = kind.category();
        let index = entry
            .members
            .iter()
            .filter(|m| m.kind.category() == cat)
            .count();
        self.member_at(group, key, kind, index)
    }

    /// Add a member with an explicit sibling index.
    pub fn member_at(
        &mut self,
        group: GroupId,
        key: impl Into<ElementKey>,
        kind: RevealKind,
        index: usize,
    ) -> Result<(), RevealError> {
        let key = key.into();
        if self.by_key.contains_key(&key) {
            return Err(RevealError::DuplicateElement(key));
        }
        let entry = self
            .groups
            .get_mut(group.0 as usize)
            .ok_or(RevealError::UnknownGroup(group))?;
        self.by_key.insert(key.clone(), group);
        entry.members.push(Member { key, kind, index });
        Ok(())
    }

    pub fn build(self) -> Registry {
        Registry {
            groups: self.groups,
            by_key: self.by_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(target: &str) -> RevealKind {
        RevealKind::Counter {
            target: target.into(),
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    #[test]
    fn sibling_indices_are_per_category() {
        let mut b = RegistryBuilder::new();
        let g = b.group(GroupSpec::new(GroupKind::Metrics));
        b.member(g, "c0", counter("10")).unwrap();
        b.member(g, "t0", RevealKind::TypedText { text: "x".into() })
            .unwrap();
        b.member(g, "c1", counter("20")).unwrap();
        let reg = b.build();
        let members = &reg.group(g).unwrap().members;
        let idx: Vec<(&str, usize)> = members.iter().map(|m| (m.key.as_str(), m.index)).collect();
        assert_eq!(idx, vec![("c0", 0), ("t0", 0), ("c1", 1)]);
        assert_eq!(reg.group_of("c1"), Some(g));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut b = RegistryBuilder::new();
        let g = b.group(GroupSpec::new(GroupKind::Fade));
        b.member(g, "card", RevealKind::FadeCard).unwrap();
        let err = b.member(g, "card", RevealKind::FadeCard).unwrap_err();
        assert!(matches!(err, RevealError::DuplicateElement(k) if k == "card"));
    }

    #[test]
    fn unknown_group_is_rejected() {
        let mut b = RegistryBuilder::new();
        let err = b.member(GroupId(7), "x", RevealKind::FadeCard).unwrap_err();
        assert!(matches!(err, RevealError::UnknownGroup(GroupId(7))));
    }

    #[test]
    fn commands_default_to_load_trigger() {
        assert_eq!(GroupSpec::new(GroupKind::Commands).trigger, Trigger::Load);
        assert_eq!(GroupSpec::new(GroupKind::Chart).trigger, Trigger::Visible);
    }

    #[test]
    fn page_json_builds_registry() {
        let json = r#"{
            "groups": [
                { "kind": "metrics", "members": [
                    { "key": "users", "reveal": { "type": "counter", "target": "2700", "suffix": "+" } },
                    { "key": "acc", "reveal": { "type": "typed_text", "text": "98.25%" } }
                ]},
                { "kind": "fade", "members": [
                    { "key": "card-2", "reveal": { "type": "fade_card" }, "index": 2 }
                ]}
            ]
        }"#;
        let reg = Registry::from_page_json(json).unwrap();
        assert_eq!(reg.len(), 2);
        let fade = reg.group(GroupId(1)).unwrap();
        assert_eq!(fade.members[0].index, 2);
        assert_eq!(reg.group_of("acc"), Some(GroupId(0)));
    }
}
