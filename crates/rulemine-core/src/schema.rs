//! Typed feature schema: feature name → namespace, built once per table.

use crate::error::{Result, RuleMineError, TableError};
use crate::types::{FeatureId, Namespace, NamespacePrefixes};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named boolean feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub namespace: Namespace,
}

/// Ordered set of features for one feature table.
///
/// Namespaces are resolved from the reserved prefixes when the schema is
/// built and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    features: Vec<Feature>,
    prefixes: NamespacePrefixes,
    index: HashMap<String, FeatureId>,
}

impl Schema {
    /// Build a schema from column names. Every column must carry one of the
    /// two reserved prefixes and names must be unique.
    pub fn from_columns<S: AsRef<str>>(columns: &[S], prefixes: &NamespacePrefixes) -> Result<Self> {
        prefixes.validate()?;
        let mut features = Vec::with_capacity(columns.len());
        let mut index = HashMap::with_capacity(columns.len());

        for (i, column) in columns.iter().enumerate() {
            let name = column.as_ref().to_string();
            let namespace = prefixes
                .classify(&name)
                .ok_or_else(|| TableError::UnknownNamespace(name.clone()))?;
            if index.insert(name.clone(), FeatureId::from(i)).is_some() {
                return Err(TableError::DuplicateColumn(name).into());
            }
            features.push(Feature { name, namespace });
        }

        Ok(Self {
            features,
            prefixes: prefixes.clone(),
            index,
        })
    }

    /// Restrict the schema to the given features, in the given order.
    pub fn project(&self, ids: &[FeatureId]) -> Result<Self> {
        let names: Vec<&str> = ids.iter().map(|&id| self.name(id)).collect();
        Self::from_columns(&names, &self.prefixes)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn prefixes(&self) -> &NamespacePrefixes {
        &self.prefixes
    }

    pub fn feature(&self, id: FeatureId) -> &Feature {
        &self.features[id.index()]
    }

    pub fn name(&self, id: FeatureId) -> &str {
        &self.features[id.index()].name
    }

    pub fn namespace(&self, id: FeatureId) -> Namespace {
        self.features[id.index()].namespace
    }

    /// Look up a feature by name.
    pub fn id_of(&self, name: &str) -> Option<FeatureId> {
        self.index.get(name).copied()
    }

    /// Look up a feature by name, failing on unknown names.
    pub fn require(&self, name: &str) -> Result<FeatureId> {
        self.id_of(name).ok_or_else(|| RuleMineError::unknown_feature(name))
    }

    pub fn ids(&self) -> impl Iterator<Item = FeatureId> + '_ {
        (0..self.features.len()).map(FeatureId::from)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Column names in schema order.
    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn count_in(&self, namespace: Namespace) -> usize {
        self.features.iter().filter(|f| f.namespace == namespace).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_namespaces_once() {
        let schema = Schema::from_columns(
            &["inf_care_virtue", "usr_ethos_attack", "inf_valence_high"],
            &NamespacePrefixes::default(),
        )
        .unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.count_in(Namespace::Influencer), 2);
        let id = schema.id_of("usr_ethos_attack").unwrap();
        assert_eq!(schema.namespace(id), Namespace::User);
        assert_eq!(schema.name(id), "usr_ethos_attack");
    }

    #[test]
    fn rejects_unprefixed_and_duplicate_columns() {
        let prefixes = NamespacePrefixes::default();
        let err = Schema::from_columns(&["inf_a", "username"], &prefixes).unwrap_err();
        assert_eq!(
            err,
            RuleMineError::Table(TableError::UnknownNamespace("username".into()))
        );

        let err = Schema::from_columns(&["inf_a", "inf_a"], &prefixes).unwrap_err();
        assert_eq!(
            err,
            RuleMineError::Table(TableError::DuplicateColumn("inf_a".into()))
        );
    }

    #[test]
    fn projection_keeps_order() {
        let schema =
            Schema::from_columns(&["inf_a", "inf_b", "usr_c"], &NamespacePrefixes::default())
                .unwrap();
        let projected = schema.project(&[FeatureId(2), FeatureId(0)]).unwrap();
        assert_eq!(projected.names(), vec!["usr_c", "inf_a"]);
        assert_eq!(projected.id_of("inf_a"), Some(FeatureId(1)));
    }
}
