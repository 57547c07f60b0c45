use pretty_assertions::assert_eq;
use serde::Deserialize;
use witness_collation::{Apparatus, VariantGraph, Witness, WitnessId};

/// A collation scenario read from `tests/examples/*.yml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExampleDocument {
    name: String,
    witnesses: Vec<ExampleWitness>,

    /// Expected apparatus when the witnesses are merged in the listed order
    #[serde(default)]
    apparatus: Option<String>,

    #[serde(default)]
    transpositions: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExampleWitness {
    id: String,
    text: String,
}

impl ExampleDocument {
    pub fn name(&self) -> &str { &self.name }

    pub fn witnesses(&self) -> Vec<Witness> {
        self.witnesses
            .iter()
            .map(|witness| Witness::from_text(witness.id.as_str(), &witness.text))
            .collect()
    }

    /// Every witness must read back exactly as it was given.
    pub fn assert_round_trip(&self, graph: &VariantGraph) {
        for witness in &self.witnesses {
            let tokens = graph
                .witness_tokens(&WitnessId::from(witness.id.as_str()))
                .unwrap_or_else(|error| panic!("{}: {error}", self.name));

            assert_eq!(
                tokens
                    .iter()
                    .map(|token| token.normalized())
                    .collect::<Vec<_>>(),
                witness.text.split_whitespace().collect::<Vec<_>>(),
                "{}: witness `{}` does not read back",
                self.name,
                witness.id
            );
        }
    }

    pub fn assert_expected(&self, graph: &VariantGraph) {
        if let Some(expected) = &self.apparatus {
            assert_eq!(
                Apparatus::from_graph(graph).to_string(),
                expected.trim_end(),
                "{}: unexpected apparatus",
                self.name
            );
        }

        if let Some(expected) = self.transpositions {
            assert_eq!(
                graph.transpositions().len(),
                expected,
                "{}: unexpected number of transpositions",
                self.name
            );
        }
    }
}
