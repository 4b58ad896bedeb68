use serde::Serialize;

use crate::engine::{Mode, WorkUnit};

/// Body for the single-term and single-pair endpoints.
#[derive(Serialize, Debug)]
pub struct SingleQuery<'a> {
    pub search_type: &'static str,
    pub query: &'a str,
}

/// Body for the batch endpoints: terms joined with `,`.
#[derive(Serialize, Debug)]
pub struct BatchQuery<'a> {
    pub query: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Definition,
    DefinitionBatch,
    Relation,
    RelationBatch,
}

impl Endpoint {
    pub fn for_unit(mode: Mode, unit: &WorkUnit) -> Self {
        match (mode, unit) {
            (Mode::Definition, WorkUnit::Batch(_)) => Endpoint::DefinitionBatch,
            (Mode::Definition, _) => Endpoint::Definition,
            (Mode::Relation, WorkUnit::Batch(_)) => Endpoint::RelationBatch,
            (Mode::Relation, _) => Endpoint::Relation,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Definition => "definition",
            Endpoint::DefinitionBatch => "definition/batch",
            Endpoint::Relation => "relation",
            Endpoint::RelationBatch => "relation/batch",
        }
    }

    pub fn is_batch(self) -> bool {
        matches!(self, Endpoint::DefinitionBatch | Endpoint::RelationBatch)
    }

    /// The `search_type` sent to single endpoints.
    pub fn search_type(self) -> &'static str {
        match self {
            Endpoint::Definition | Endpoint::DefinitionBatch => "definition",
            Endpoint::Relation | Endpoint::RelationBatch => "relation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::TermPair;

    #[test]
    fn units_route_to_endpoints() {
        assert_eq!(
            Endpoint::for_unit(Mode::Definition, &WorkUnit::Term("海浪".into())),
            Endpoint::Definition
        );
        assert_eq!(
            Endpoint::for_unit(Mode::Definition, &WorkUnit::Batch("a,b".into())),
            Endpoint::DefinitionBatch
        );
        assert_eq!(
            Endpoint::for_unit(Mode::Relation, &WorkUnit::Pair(TermPair::new("a", "b"))),
            Endpoint::Relation
        );
        assert_eq!(
            Endpoint::for_unit(Mode::Relation, &WorkUnit::Batch("a,b,c".into())),
            Endpoint::RelationBatch
        );
    }

    #[test]
    fn single_body_shape() {
        let body = serde_json::to_value(SingleQuery {
            search_type: "definition",
            query: "海浪",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"search_type": "definition", "query": "海浪"}));
    }
}
