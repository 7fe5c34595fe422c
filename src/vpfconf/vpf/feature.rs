//! Feature class tables of a coverage and their mapping onto catalog
//! feature records.

use super::find_entry;
use super::table::Table;
use crate::error::Result;
use crate::model::{FeatureRecord, FeatureType};
use std::path::Path;

const FCS: &str = "fcs";
const FCA: &str = "fca";

/// One row of the Feature Class Schema: a join from a feature table to the
/// next table on the way to its primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLink {
    pub feature_class: String,
    pub table1: String,
    pub table2: String,
}

#[derive(Debug, Clone, Default)]
pub struct FeatureClassSchema {
    links: Vec<SchemaLink>,
}

impl FeatureClassSchema {
    /// Read `fcs` from a coverage directory; a coverage without one has an
    /// empty schema.
    pub fn open(coverage_dir: &Path) -> Result<Self> {
        let Some(path) = find_entry(coverage_dir, FCS) else {
            return Ok(Self::default());
        };
        let table = Table::open(&path)?;
        let class_col = table.require_column("feature_class")?;
        let t1_col = table.require_column("table1")?;
        let t2_col = table.require_column("table2")?;

        let links = table
            .rows()
            .map(|row| {
                Ok(SchemaLink {
                    feature_class: table.text(row, class_col)?.to_ascii_lowercase(),
                    table1: table.text(row, t1_col)?.to_ascii_lowercase(),
                    table2: table.text(row, t2_col)?.to_ascii_lowercase(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { links })
    }

    pub fn links(&self) -> &[SchemaLink] {
        &self.links
    }

    fn links_for<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a SchemaLink> + 'a {
        self.links
            .iter()
            .filter(move |l| l.feature_class.eq_ignore_ascii_case(class))
    }

    /// The feature table a class is stored in (`roadl.lft`), if the schema names one.
    pub fn feature_table(&self, class: &str) -> Option<&str> {
        self.links
            .iter()
            .filter(|l| l.feature_class.eq_ignore_ascii_case(class))
            .map(|l| l.table1.as_str())
            .find(|t| feature_table_type(t).is_some())
    }

    /// Point classes resolve to entity or connected nodes through the schema.
    pub fn refine_point(&self, class: &str) -> FeatureType {
        for link in self.links_for(class) {
            match table_stem(&link.table2) {
                "end" => return FeatureType::EntityPoint,
                "cnd" => return FeatureType::ConnectedPoint,
                _ => {}
            }
        }
        FeatureType::Point
    }

    /// Distinct classes with a feature table, in schema order.
    fn feature_classes(&self) -> Vec<(&str, &str)> {
        let mut seen: Vec<(&str, &str)> = Vec::new();
        for link in &self.links {
            if feature_table_type(&link.table1).is_some()
                && !seen.iter().any(|(c, _)| *c == link.feature_class)
            {
                seen.push((link.feature_class.as_str(), link.table1.as_str()));
            }
        }
        seen
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAttributes {
    pub class: String,
    pub type_code: char,
    pub description: String,
}

/// The optional Feature Class Attribute table carrying type codes and
/// descriptions.
#[derive(Debug, Clone, Default)]
pub struct FeatureClassAttributes {
    rows: Vec<ClassAttributes>,
}

impl FeatureClassAttributes {
    pub fn open(coverage_dir: &Path) -> Result<Option<Self>> {
        let Some(path) = find_entry(coverage_dir, FCA) else {
            return Ok(None);
        };
        let table = Table::open(&path)?;
        let class_col = table.require_column("fclass")?;
        let type_col = table.require_column("type")?;
        let descr_col = table.column_index("descr");

        let mut rows = Vec::with_capacity(table.len());
        for row in table.rows() {
            let class = table.text(row, class_col)?.to_string();
            if class.is_empty() {
                continue;
            }
            let type_code = table
                .text(row, type_col)?
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or(' ');
            let description = match descr_col {
                Some(c) => table.text(row, c)?.to_string(),
                None => class.clone(),
            };
            rows.push(ClassAttributes {
                class,
                type_code,
                description,
            });
        }
        Ok(Some(Self { rows }))
    }

    pub fn rows(&self) -> &[ClassAttributes] {
        &self.rows
    }
}

/// Catalog records for every feature class of the coverage at `coverage_dir`.
///
/// Classes come from the FCA when present, otherwise from the feature tables
/// named in the FCS. A class whose feature table is missing from the directory
/// is returned marked as skipped.
pub fn read_feature_records(coverage_dir: &Path) -> Result<Vec<FeatureRecord>> {
    let schema = FeatureClassSchema::open(coverage_dir)?;
    let records = match FeatureClassAttributes::open(coverage_dir)? {
        Some(fca) => fca
            .rows()
            .iter()
            .map(|attrs| {
                let feature_type = match attrs.type_code {
                    'P' => schema.refine_point(&attrs.class),
                    code => type_from_code(code),
                };
                let table = schema
                    .feature_table(&attrs.class)
                    .map(str::to_string)
                    .or_else(|| default_feature_table(&attrs.class, attrs.type_code));
                let record =
                    FeatureRecord::new(&attrs.class, &attrs.description, feature_type);
                mark_missing(record, coverage_dir, table.as_deref())
            })
            .collect(),
        None => schema
            .feature_classes()
            .into_iter()
            .map(|(class, table)| {
                let feature_type = match feature_table_type(table) {
                    Some(FeatureType::Point) => schema.refine_point(class),
                    Some(ft) => ft,
                    None => FeatureType::Unknown,
                };
                let record = FeatureRecord::new(class, class, feature_type);
                mark_missing(record, coverage_dir, Some(table))
            })
            .collect(),
    };
    Ok(records)
}

fn mark_missing(record: FeatureRecord, dir: &Path, table: Option<&str>) -> FeatureRecord {
    match table {
        Some(t) if find_entry(dir, t).is_some() => record,
        _ => record.skipped(),
    }
}

fn type_from_code(code: char) -> FeatureType {
    match code {
        'A' => FeatureType::Area,
        'L' => FeatureType::Edge,
        'T' => FeatureType::Text,
        'P' => FeatureType::Point,
        'C' => FeatureType::Complex,
        _ => FeatureType::Unknown,
    }
}

fn default_feature_table(class: &str, code: char) -> Option<String> {
    let ext = match code {
        'A' => "aft",
        'L' => "lft",
        'T' => "tft",
        'P' => "pft",
        'C' => "cft",
        _ => return None,
    };
    Some(format!("{}.{}", class.to_ascii_lowercase(), ext))
}

fn table_stem(table: &str) -> &str {
    table.split('.').next().unwrap_or(table).trim()
}

fn feature_table_type(table: &str) -> Option<FeatureType> {
    let (_, ext) = table.rsplit_once('.')?;
    let ext = ext.trim().to_ascii_lowercase();
    match ext.as_str() {
        "aft" => Some(FeatureType::Area),
        "lft" => Some(FeatureType::Edge),
        "tft" => Some(FeatureType::Text),
        "pft" => Some(FeatureType::Point),
        "cft" => Some(FeatureType::Complex),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;
    use crate::vpf::builder::DatabaseBuilder;
    use std::path::PathBuf;

    fn coverage_dir(env: &TestEnv, lib: &str, cov: &str) -> PathBuf {
        env.root().join(lib).join(cov)
    }

    #[test]
    fn test_fca_classes_keep_table_order_and_types() {
        let db = DatabaseBuilder::new()
            .library("l1", |l| {
                l.coverage("c1", "Political", |c| {
                    c.feature("road", "Roads", 'L')
                        .feature("city", "Cities", 'P')
                        .feature("lake", "Lakes", 'A')
                })
            });
        let env = TestEnv::new(db);
        let records = read_feature_records(&coverage_dir(&env, "l1", "c1")).unwrap();
        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.name.as_str(), r.feature_type, r.skip))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("road", FeatureType::Edge, false),
                ("city", FeatureType::Point, false),
                ("lake", FeatureType::Area, false),
            ]
        );
        assert_eq!(records[0].description, "Roads");
    }

    #[test]
    fn test_point_classes_refined_by_primitive() {
        let db = DatabaseBuilder::new()
            .library("l1", |l| {
                l.coverage("c1", "Places", |c| {
                    c.point_feature("towns", "Towns", "end")
                        .point_feature("junctions", "Junctions", "cnd")
                        .feature("text", "Names", 'T')
                })
            });
        let env = TestEnv::new(db);
        let records = read_feature_records(&coverage_dir(&env, "l1", "c1")).unwrap();
        let types: Vec<_> = records.iter().map(|r| r.feature_type).collect();
        assert_eq!(
            types,
            vec![
                FeatureType::EntityPoint,
                FeatureType::ConnectedPoint,
                FeatureType::Text
            ]
        );
    }

    #[test]
    fn test_feature_table_outlives_class_name() {
        let link = |class: &str, t1: &str, t2: &str| SchemaLink {
            feature_class: class.into(),
            table1: t1.into(),
            table2: t2.into(),
        };
        let schema = FeatureClassSchema {
            links: vec![
                link("roadl", "roadl.lft", "edg"),
                link("roadl", "edg", "edg"),
            ],
        };
        let table = {
            let class = String::from("ROADL");
            schema.feature_table(&class)
        };
        assert_eq!(table, Some("roadl.lft"));
        assert_eq!(schema.feature_table("rivers"), None);
    }

    #[test]
    fn test_missing_feature_table_marks_skip() {
        let db = DatabaseBuilder::new()
            .library("l1", |l| {
                l.coverage("c1", "Hydro", |c| {
                    c.feature("rivers", "Rivers", 'L')
                        .described_only("wells", "Wells", 'P')
                })
            });
        let env = TestEnv::new(db);
        let records = read_feature_records(&coverage_dir(&env, "l1", "c1")).unwrap();
        assert!(!records[0].skip);
        assert!(records[1].skip);
    }

    #[test]
    fn test_unknown_type_code_maps_to_unknown() {
        let db = DatabaseBuilder::new()
            .library("l1", |l| {
                l.coverage("c1", "Misc", |c| c.feature("odd", "Odd", 'Q'))
            });
        let env = TestEnv::new(db);
        let records = read_feature_records(&coverage_dir(&env, "l1", "c1")).unwrap();
        assert_eq!(records[0].feature_type, FeatureType::Unknown);
    }

    #[test]
    fn test_schema_only_coverage_derives_classes() {
        let db = DatabaseBuilder::new()
            .library("l1", |l| {
                l.coverage("c1", "Transport", |c| {
                    c.feature("roadl", "Roads", 'L')
                        .feature("airportp", "Airports", 'P')
                        .without_fca()
                })
            });
        let env = TestEnv::new(db);
        let records = read_feature_records(&coverage_dir(&env, "l1", "c1")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "roadl");
        assert_eq!(records[0].description, "roadl");
        assert_eq!(records[0].feature_type, FeatureType::Edge);
        assert_eq!(records[1].feature_type, FeatureType::Point);
    }

    #[test]
    fn test_empty_coverage_has_no_records() {
        let db = DatabaseBuilder::new()
            .library("l1", |l| l.coverage("c1", "Empty", |c| c));
        let env = TestEnv::new(db);
        let records = read_feature_records(&coverage_dir(&env, "l1", "c1")).unwrap();
        assert!(records.is_empty());
    }
}
