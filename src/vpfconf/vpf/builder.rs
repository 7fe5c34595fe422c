//! Writes the metadata skeleton of a VPF database: `lat`, per-library `cat`,
//! per-coverage `fcs`/`fca`, and empty feature tables.
//!
//! Used to produce sample catalogs and test data without shipping binary
//! fixtures.

use super::table::{Column, Count, FieldKind, TableWriter, Value};
use crate::error::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    libraries: Vec<LibraryBuilder>,
}

#[derive(Debug, Clone)]
pub struct LibraryBuilder {
    name: String,
    tiled: bool,
    coverages: Vec<CoverageBuilder>,
}

#[derive(Debug, Clone)]
pub struct CoverageBuilder {
    name: String,
    description: String,
    classes: Vec<ClassSpec>,
    write_fca: bool,
}

#[derive(Debug, Clone)]
struct ClassSpec {
    name: String,
    description: String,
    type_code: char,
    primitive: String,
    has_table: bool,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn library(
        mut self,
        name: &str,
        f: impl FnOnce(LibraryBuilder) -> LibraryBuilder,
    ) -> Self {
        self.libraries.push(f(LibraryBuilder {
            name: name.to_string(),
            tiled: false,
            coverages: Vec::new(),
        }));
        self
    }

    pub fn write(&self, root: &Path) -> Result<()> {
        fs::create_dir_all(root)?;
        let mut lat = TableWriter::new(
            "Library Attribute Table",
            vec![
                Column::new("id", FieldKind::Int, Count::Fixed(1)).with_key('P'),
                Column::new("library_name", FieldKind::Text, Count::Fixed(16))
                    .described("Library Name"),
            ],
        );
        for (i, library) in self.libraries.iter().enumerate() {
            lat = lat.row(vec![
                Value::Int(i as i32 + 1),
                Value::Text(library.name.clone()),
            ]);
            library.write(&root.join(&library.name))?;
        }
        lat.write(root.join("lat"))
    }
}

impl LibraryBuilder {
    pub fn tiled(mut self) -> Self {
        self.tiled = true;
        self
    }

    pub fn coverage(
        mut self,
        name: &str,
        description: &str,
        f: impl FnOnce(CoverageBuilder) -> CoverageBuilder,
    ) -> Self {
        self.coverages.push(f(CoverageBuilder {
            name: name.to_string(),
            description: description.to_string(),
            classes: Vec::new(),
            write_fca: true,
        }));
        self
    }

    fn write(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        if self.tiled {
            fs::create_dir_all(dir.join("tileref"))?;
        }
        let mut cat = TableWriter::new(
            "Coverage Attribute Table",
            vec![
                Column::new("id", FieldKind::Int, Count::Fixed(1)).with_key('P'),
                Column::new("coverage_name", FieldKind::Text, Count::Fixed(16)),
                Column::new("description", FieldKind::Text, Count::Variable),
                Column::new("level", FieldKind::Short, Count::Fixed(1)),
            ],
        );
        for (i, coverage) in self.coverages.iter().enumerate() {
            cat = cat.row(vec![
                Value::Int(i as i32 + 1),
                Value::Text(coverage.name.clone()),
                Value::Text(coverage.description.clone()),
                Value::Short(3),
            ]);
            coverage.write(&dir.join(&coverage.name))?;
        }
        cat.write(dir.join("cat"))
    }
}

impl CoverageBuilder {
    /// A feature class with type code `A`, `L`, `T`, `P` or `C`.
    pub fn feature(self, name: &str, description: &str, type_code: char) -> Self {
        let primitive = match type_code {
            'A' => "fac",
            'L' => "edg",
            'T' => "txt",
            _ => "-",
        };
        self.push(name, description, type_code, primitive, true)
    }

    /// A point class built on `end` (entity) or `cnd` (connected) nodes.
    pub fn point_feature(self, name: &str, description: &str, primitive: &str) -> Self {
        self.push(name, description, 'P', primitive, true)
    }

    /// A class listed in the metadata whose feature table is absent.
    pub fn described_only(self, name: &str, description: &str, type_code: char) -> Self {
        self.push(name, description, type_code, "-", false)
    }

    pub fn without_fca(mut self) -> Self {
        self.write_fca = false;
        self
    }

    fn push(
        mut self,
        name: &str,
        description: &str,
        type_code: char,
        primitive: &str,
        has_table: bool,
    ) -> Self {
        self.classes.push(ClassSpec {
            name: name.to_string(),
            description: description.to_string(),
            type_code,
            primitive: primitive.to_string(),
            has_table,
        });
        self
    }

    fn write(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let text = |n: &str| Column::new(n, FieldKind::Text, Count::Variable);

        let mut fcs = TableWriter::new(
            "Feature Class Schema",
            vec![
                Column::new("id", FieldKind::Int, Count::Fixed(1)).with_key('P'),
                text("feature_class"),
                text("table1"),
                text("table1_key"),
                text("table2"),
                text("table2_key"),
            ],
        );
        let mut fca = TableWriter::new(
            "Feature Class Attribute Table",
            vec![
                Column::new("id", FieldKind::Int, Count::Fixed(1)).with_key('P'),
                text("fclass"),
                Column::new("type", FieldKind::Text, Count::Fixed(1)),
                text("descr"),
            ],
        );

        for (i, class) in self.classes.iter().enumerate() {
            let table = format!("{}.{}", class.name, table_ext(class.type_code));
            fcs = fcs.row(vec![
                Value::Int(i as i32 + 1),
                Value::Text(class.name.clone()),
                Value::Text(table.clone()),
                Value::Text("id".into()),
                Value::Text(class.primitive.clone()),
                Value::Text("id".into()),
            ]);
            fca = fca.row(vec![
                Value::Int(i as i32 + 1),
                Value::Text(class.name.clone()),
                Value::Text(class.type_code.to_string()),
                Value::Text(class.description.clone()),
            ]);
            if class.has_table {
                TableWriter::new(
                    &class.description,
                    vec![Column::new("id", FieldKind::Int, Count::Fixed(1)).with_key('P')],
                )
                .write(dir.join(&table))?;
            }
        }

        if !self.classes.is_empty() {
            fcs.write(dir.join("fcs"))?;
        }
        if self.write_fca && !self.classes.is_empty() {
            fca.write(dir.join("fca"))?;
        }
        Ok(())
    }
}

fn table_ext(type_code: char) -> &'static str {
    match type_code {
        'A' => "aft",
        'L' => "lft",
        'T' => "tft",
        'P' => "pft",
        'C' => "cft",
        _ => "xft",
    }
}
