//! VPF table codec.
//!
//! Every VPF table is a header followed by records:
//!
//! ```text
//! i32 header length
//! [L|M] ;  description ;  narrative ;  col=T,n,key,desc,vdt,index,narr, : ... ;
//! records
//! ```
//!
//! The header length is little-endian unless the byte-order mark is `M`, in
//! which case the length and all record values are big-endian. Metadata
//! tables are small, so tables are decoded in one pass into memory.

use crate::error::{Result, VpfError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DATE_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn mark(&self) -> char {
        match self {
            ByteOrder::Little => 'L',
            ByteOrder::Big => 'M',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Float,
    Double,
    Short,
    Int,
    Date,
    Null,
    Triplet,
    Coord2F,
    Coord2D,
    Coord3F,
    Coord3D,
}

impl FieldKind {
    fn from_code(c: char) -> Option<Self> {
        Some(match c {
            // L, N and M are text in the Latin-1 / multilingual charsets.
            'T' | 'L' | 'N' | 'M' => FieldKind::Text,
            'F' => FieldKind::Float,
            'R' => FieldKind::Double,
            'S' => FieldKind::Short,
            'I' => FieldKind::Int,
            'D' => FieldKind::Date,
            'X' => FieldKind::Null,
            'K' => FieldKind::Triplet,
            'C' => FieldKind::Coord2F,
            'B' => FieldKind::Coord2D,
            'Z' => FieldKind::Coord3F,
            'Y' => FieldKind::Coord3D,
            _ => return None,
        })
    }

    fn code(&self) -> char {
        match self {
            FieldKind::Text => 'T',
            FieldKind::Float => 'F',
            FieldKind::Double => 'R',
            FieldKind::Short => 'S',
            FieldKind::Int => 'I',
            FieldKind::Date => 'D',
            FieldKind::Null => 'X',
            FieldKind::Triplet => 'K',
            FieldKind::Coord2F => 'C',
            FieldKind::Coord2D => 'B',
            FieldKind::Coord3F => 'Z',
            FieldKind::Coord3D => 'Y',
        }
    }

    fn dims(&self) -> usize {
        match self {
            FieldKind::Coord2F | FieldKind::Coord2D => 2,
            FieldKind::Coord3F | FieldKind::Coord3D => 3,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Fixed(usize),
    Variable,
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Fixed(n) => write!(f, "{}", n),
            Count::Variable => f.write_str("*"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Lowercased column name.
    pub name: String,
    pub kind: FieldKind,
    pub count: Count,
    pub key_type: char,
    pub description: String,
}

impl Column {
    pub fn new(name: &str, kind: FieldKind, count: Count) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            kind,
            count,
            key_type: 'N',
            description: "-".to_string(),
        }
    }

    pub fn with_key(mut self, key_type: char) -> Self {
        self.key_type = key_type;
        self
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    fn header_entry(&self) -> String {
        format!(
            "{}={},{},{},{},-,-,-,:",
            self.name.to_ascii_uppercase(),
            self.kind.code(),
            self.count,
            self.key_type,
            self.description
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripletId {
    pub id: i32,
    pub tile: i32,
    pub ext: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Float(f32),
    Double(f64),
    Short(i16),
    Int(i32),
    Date(String),
    Null,
    Triplet(TripletId),
    Coords { dims: usize, values: Vec<f64> },
    Array(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Date(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub path: PathBuf,
    pub byte_order: ByteOrder,
    pub description: String,
    pub narrative: Option<String>,
    pub columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| VpfError::format(path, e.to_string()))?;
        let table = Self::decode(&bytes, path)?;
        debug!(
            path = %path.display(),
            columns = table.columns.len(),
            rows = table.rows.len(),
            "read VPF table"
        );
        Ok(table)
    }

    /// Decode a table image; `path` is only used in error reports.
    pub fn decode(bytes: &[u8], path: &Path) -> Result<Self> {
        let mut cur = Cursor::new(bytes, path);
        let raw_len = cur.take(4)?;
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(raw_len);

        let first = *bytes.get(4).ok_or_else(|| cur.error("missing header"))?;
        let byte_order = match first {
            b'M' | b'm' => ByteOrder::Big,
            _ => ByteOrder::Little,
        };
        let header_len = match byte_order {
            ByteOrder::Little => i32::from_le_bytes(len_bytes),
            ByteOrder::Big => i32::from_be_bytes(len_bytes),
        };
        let header_len = usize::try_from(header_len)
            .map_err(|_| cur.error(format!("negative header length {}", header_len)))?;
        let header_raw = cur.take(header_len)?;
        let header = String::from_utf8_lossy(header_raw);
        let (description, narrative, columns) = parse_header(&header, path)?;
        cur.order = byte_order;

        let mut rows = Vec::new();
        while !cur.at_end() {
            let start = cur.pos;
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                row.push(cur.read_field(column)?);
            }
            if cur.pos == start {
                return Err(cur.error("records occupy no bytes"));
            }
            rows.push(row);
        }

        Ok(Table {
            path: path.to_path_buf(),
            byte_order,
            description,
            narrative,
            columns,
            rows,
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Like [`Table::column_index`], but a missing column is a format error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| VpfError::format(&self.path, format!("missing column '{}'", name)))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text content of a cell, or a format error if the cell is not text.
    pub fn text<'a>(&self, row: &'a [Value], col: usize) -> Result<&'a str> {
        row.get(col).and_then(Value::as_str).ok_or_else(|| {
            VpfError::format(
                &self.path,
                format!("column '{}' is not text", self.columns[col].name),
            )
        })
    }
}

fn parse_header(header: &str, path: &Path) -> Result<(String, Option<String>, Vec<Column>)> {
    let err = |detail: String| VpfError::format(path, detail);

    let mut rest = header.trim_start();
    if let Some(c) = rest.chars().next() {
        if matches!(c, 'L' | 'l' | 'M' | 'm') {
            rest = rest[1..].trim_start();
        }
    }
    rest = rest
        .strip_prefix(';')
        .ok_or_else(|| err("header must start with byte order and ';'".into()))?;

    let (description, rest) = rest
        .split_once(';')
        .ok_or_else(|| err("unterminated table description".into()))?;
    let (narrative, rest) = rest
        .split_once(';')
        .ok_or_else(|| err("unterminated narrative table name".into()))?;
    let (column_defs, _) = rest
        .rsplit_once(';')
        .ok_or_else(|| err("unterminated column definitions".into()))?;

    let columns = column_defs
        .split(':')
        .map(str::trim)
        .filter(|def| !def.is_empty())
        .map(|def| parse_column(def).map_err(err))
        .collect::<Result<Vec<_>>>()?;
    if columns.is_empty() {
        return Err(err("table declares no columns".into()));
    }

    let narrative = narrative.trim();
    let narrative = (narrative != "-" && !narrative.is_empty()).then(|| narrative.to_string());
    Ok((description.trim().to_string(), narrative, columns))
}

fn parse_column(def: &str) -> std::result::Result<Column, String> {
    let (name, spec) = def
        .split_once('=')
        .ok_or_else(|| format!("column definition without '=': {}", def))?;
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return Err(format!("column definition too short: {}", def));
    }

    let code = parts[0]
        .chars()
        .next()
        .ok_or_else(|| format!("missing field type: {}", def))?;
    let kind = FieldKind::from_code(code.to_ascii_uppercase())
        .ok_or_else(|| format!("unknown field type '{}' in {}", code, def))?;
    let count = match parts[1] {
        "*" => Count::Variable,
        n => Count::Fixed(
            n.parse()
                .map_err(|_| format!("bad element count '{}' in {}", n, def))?,
        ),
    };
    let key_type = parts[2].chars().next().unwrap_or('N');
    let description = parts.get(3).copied().unwrap_or("-").to_string();

    Ok(Column {
        name: name.trim().to_ascii_lowercase(),
        kind,
        count,
        key_type,
        description,
    })
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    order: ByteOrder,
    path: &'a Path,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8], path: &'a Path) -> Self {
        Self {
            bytes,
            pos: 0,
            order: ByteOrder::Little,
            path,
        }
    }

    fn error(&self, detail: impl Into<String>) -> VpfError {
        VpfError::format(self.path, detail)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                self.error(format!("unexpected end of data at byte {}", self.pos))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_i16(&mut self) -> Result<i16> {
        let b = self.array::<2>()?;
        Ok(match self.order {
            ByteOrder::Little => i16::from_le_bytes(b),
            ByteOrder::Big => i16::from_be_bytes(b),
        })
    }

    fn read_i32(&mut self) -> Result<i32> {
        let b = self.array::<4>()?;
        Ok(match self.order {
            ByteOrder::Little => i32::from_le_bytes(b),
            ByteOrder::Big => i32::from_be_bytes(b),
        })
    }

    fn read_f32(&mut self) -> Result<f32> {
        let b = self.array::<4>()?;
        Ok(match self.order {
            ByteOrder::Little => f32::from_le_bytes(b),
            ByteOrder::Big => f32::from_be_bytes(b),
        })
    }

    fn read_f64(&mut self) -> Result<f64> {
        let b = self.array::<8>()?;
        Ok(match self.order {
            ByteOrder::Little => f64::from_le_bytes(b),
            ByteOrder::Big => f64::from_be_bytes(b),
        })
    }

    fn read_count(&mut self, count: Count) -> Result<usize> {
        match count {
            Count::Fixed(n) => Ok(n),
            Count::Variable => {
                let n = self.read_i32()?;
                usize::try_from(n).map_err(|_| self.error(format!("negative element count {}", n)))
            }
        }
    }

    fn read_text(&mut self, n: usize) -> Result<String> {
        let raw = self.take(n)?;
        // Latin-1 maps byte-for-byte onto the first 256 code points.
        let text: String = raw.iter().map(|&b| b as char).collect();
        Ok(text.trim_end_matches([' ', '\0']).to_string())
    }

    fn read_triplet(&mut self) -> Result<TripletId> {
        let [kind] = self.array::<1>()?;
        let id = self.read_sized((kind >> 6) & 3)?;
        let tile = self.read_sized((kind >> 4) & 3)?;
        let ext = self.read_sized((kind >> 2) & 3)?;
        Ok(TripletId { id, tile, ext })
    }

    fn read_sized(&mut self, code: u8) -> Result<i32> {
        Ok(match code {
            0 => 0,
            1 => i32::from(self.array::<1>()?[0]),
            2 => i32::from(self.read_i16()? as u16),
            _ => self.read_i32()?,
        })
    }

    fn read_scalar(&mut self, kind: FieldKind) -> Result<Value> {
        Ok(match kind {
            FieldKind::Float => Value::Float(self.read_f32()?),
            FieldKind::Double => Value::Double(self.read_f64()?),
            FieldKind::Short => Value::Short(self.read_i16()?),
            FieldKind::Int => Value::Int(self.read_i32()?),
            FieldKind::Date => Value::Date(self.read_text(DATE_LEN)?),
            FieldKind::Triplet => Value::Triplet(self.read_triplet()?),
            FieldKind::Null => Value::Null,
            other => return Err(self.error(format!("{:?} is not a scalar field", other))),
        })
    }

    fn read_field(&mut self, column: &Column) -> Result<Value> {
        match column.kind {
            FieldKind::Null => Ok(Value::Null),
            FieldKind::Text => {
                let n = self.read_count(column.count)?;
                Ok(Value::Text(self.read_text(n)?))
            }
            FieldKind::Coord2F | FieldKind::Coord3F | FieldKind::Coord2D | FieldKind::Coord3D => {
                let dims = column.kind.dims();
                let n = self.read_count(column.count)?;
                let total = n.checked_mul(dims).ok_or_else(|| {
                    self.error(format!("element count overflow in {}", column.name))
                })?;
                let mut values = Vec::with_capacity(total.min(4096));
                for _ in 0..total {
                    let v = match column.kind {
                        FieldKind::Coord2F | FieldKind::Coord3F => f64::from(self.read_f32()?),
                        _ => self.read_f64()?,
                    };
                    values.push(v);
                }
                Ok(Value::Coords { dims, values })
            }
            kind => match column.count {
                Count::Fixed(1) => self.read_scalar(kind),
                count => {
                    let n = self.read_count(count)?;
                    let items = (0..n)
                        .map(|_| self.read_scalar(kind))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(Value::Array(items))
                }
            },
        }
    }
}

/// Encodes tables in the same format [`Table::decode`] reads.
#[derive(Debug, Clone)]
pub struct TableWriter {
    byte_order: ByteOrder,
    description: String,
    narrative: Option<String>,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl TableWriter {
    pub fn new(description: &str, columns: Vec<Column>) -> Self {
        Self {
            byte_order: ByteOrder::Little,
            description: description.to_string(),
            narrative: None,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn narrative(mut self, table: &str) -> Self {
        self.narrative = Some(table.to_string());
        self
    }

    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut header = format!(
            "{};{};{};",
            self.byte_order.mark(),
            self.description,
            self.narrative.as_deref().unwrap_or("-")
        );
        for column in &self.columns {
            header.push_str(&column.header_entry());
        }
        header.push(';');

        let mut out = Vec::new();
        self.put_i32(&mut out, header.len() as i32);
        out.extend_from_slice(header.as_bytes());

        for (n, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(VpfError::Api(format!(
                    "row {} has {} values for {} columns",
                    n,
                    row.len(),
                    self.columns.len()
                )));
            }
            for (column, value) in self.columns.iter().zip(row) {
                self.put_field(&mut out, column, value)?;
            }
        }
        Ok(out)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    fn put_i32(&self, out: &mut Vec<u8>, v: i32) {
        match self.byte_order {
            ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn put_field(&self, out: &mut Vec<u8>, column: &Column, value: &Value) -> Result<()> {
        let mismatch = || {
            VpfError::Api(format!(
                "value {:?} does not fit column '{}'",
                value, column.name
            ))
        };
        match (column.kind, value) {
            (FieldKind::Null, _) => {}
            (FieldKind::Text, Value::Text(s)) => match column.count {
                Count::Variable => {
                    self.put_i32(out, s.len() as i32);
                    out.extend_from_slice(s.as_bytes());
                }
                Count::Fixed(n) => {
                    let mut bytes = s.as_bytes().to_vec();
                    bytes.resize(n, b' ');
                    out.extend_from_slice(&bytes);
                }
            },
            (FieldKind::Date, Value::Date(s)) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.resize(DATE_LEN, b' ');
                out.extend_from_slice(&bytes);
            }
            (FieldKind::Short, Value::Short(v)) => match self.byte_order {
                ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
                ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
            },
            (FieldKind::Int, Value::Int(v)) => self.put_i32(out, *v),
            (FieldKind::Float, Value::Float(v)) => match self.byte_order {
                ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
                ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
            },
            (FieldKind::Double, Value::Double(v)) => match self.byte_order {
                ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
                ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
            },
            (FieldKind::Triplet, Value::Triplet(t)) => {
                // Always written with 4-byte parts.
                out.push(0b1111_1100);
                self.put_i32(out, t.id);
                self.put_i32(out, t.tile);
                self.put_i32(out, t.ext);
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}
