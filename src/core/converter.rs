use crate::domain::model::{
    CastRecord, ConversionStats, ExtractedCast, CAST_COLUMNS, SELF_COMMENT_LABEL,
};
use crate::utils::error::{EtlError, Result};
use csv::{ByteRecord, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// 公開中 / 新人 / タバコ 欄位使用的標記
pub const FLAG_MARK: &str = "〇";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Source column index for every field the converter reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub name: usize,
    pub age: usize,
    pub blood_type: usize,
    pub height: usize,
    pub bust: usize,
    pub cup_size: usize,
    pub waist: usize,
    pub hip: usize,
    pub hobby: usize,
    pub weight: usize,
    pub smoking_ok: usize,
    pub is_new: usize,
    pub visible: usize,
    pub shop_comment: usize,
    pub self_comment: usize,
}

impl SourceLayout {
    /// Positional layout of the CityHeaven cast export.
    pub const CITYHEAVEN: SourceLayout = SourceLayout {
        name: 1,
        age: 16,
        blood_type: 18,
        height: 20,
        bust: 21,
        cup_size: 22,
        waist: 23,
        hip: 24,
        hobby: 28,
        weight: 39,
        smoking_ok: 42,
        is_new: 43,
        visible: 44,
        shop_comment: 45,
        self_comment: 54,
    };

    /// Rows shorter than this cannot carry the visibility marker.
    pub fn min_fields(&self) -> usize {
        self.visible + 1
    }

    /// Number of columns needed to read every field.
    pub fn width(&self) -> usize {
        [
            self.name,
            self.age,
            self.blood_type,
            self.height,
            self.bust,
            self.cup_size,
            self.waist,
            self.hip,
            self.hobby,
            self.weight,
            self.smoking_ok,
            self.is_new,
            self.visible,
            self.shop_comment,
            self.self_comment,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }

    fn slot_mut(&mut self, field: &str) -> Option<&mut usize> {
        let slot = match field {
            "name" => &mut self.name,
            "age" => &mut self.age,
            "blood_type" => &mut self.blood_type,
            "height" => &mut self.height,
            "bust" => &mut self.bust,
            "cup_size" => &mut self.cup_size,
            "waist" => &mut self.waist,
            "hip" => &mut self.hip,
            "hobby" => &mut self.hobby,
            "weight" => &mut self.weight,
            "smoking_ok" => &mut self.smoking_ok,
            "is_new" => &mut self.is_new,
            "visible" => &mut self.visible,
            "shop_comment" => &mut self.shop_comment,
            "self_comment" => &mut self.self_comment,
            _ => return None,
        };
        Some(slot)
    }

    /// Rebinds the fields listed in `columns` (field -> header title) to the
    /// header's positions. Fields not listed keep their positional index.
    pub fn bind_headers(
        &self,
        header: &StringRecord,
        columns: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut layout = self.clone();

        for (field, title) in columns {
            let index = header
                .iter()
                .position(|h| normalize_header(h) == title.trim())
                .ok_or_else(|| EtlError::ConfigError {
                    message: format!(
                        "column '{}' mapped to header '{}' which is not present in the source",
                        field, title
                    ),
                })?;

            let slot = layout
                .slot_mut(field)
                .ok_or_else(|| EtlError::ConfigError {
                    message: format!("unknown converter column '{}'", field),
                })?;
            *slot = index;
            tracing::debug!("Bound '{}' to header '{}' (index {})", field, title, index);
        }

        Ok(layout)
    }
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self::CITYHEAVEN
    }
}

fn normalize_header(title: &str) -> &str {
    title.trim_start_matches('\u{feff}').trim()
}

/// お店コメント與本人コメント合併成 profile
pub fn compose_profile(shop_comment: &str, self_comment: &str) -> String {
    match (shop_comment.is_empty(), self_comment.is_empty()) {
        (false, false) => format!("{}\n\n{}\n{}", shop_comment, SELF_COMMENT_LABEL, self_comment),
        (false, true) => shop_comment.to_string(),
        (true, false) => self_comment.to_string(),
        (true, true) => String::new(),
    }
}

/// Lines consumed by a record beyond its own terminator and embedded newlines
/// are blank lines the csv reader skipped over.
fn blank_lines_before(line_before: u64, line_after: u64, record: &ByteRecord) -> u64 {
    let embedded: u64 = record
        .iter()
        .map(|field| field.iter().filter(|&&b| b == b'\n').count() as u64)
        .sum();
    (line_after - line_before).saturating_sub(embedded + 1)
}

/// Folds `\r\n` and lone `\r` into `\n` so line numbers track records exactly.
struct UniversalNewlines<R> {
    inner: R,
    after_cr: bool,
}

impl<R: Read> UniversalNewlines<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            after_cr: false,
        }
    }
}

impl<R: Read> Read for UniversalNewlines<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            let n = self.inner.read(buf)?;
            if n == 0 {
                return Ok(0);
            }

            let mut out = 0;
            for i in 0..n {
                let b = buf[i];
                if self.after_cr && b == b'\n' {
                    self.after_cr = false;
                    continue;
                }
                self.after_cr = b == b'\r';
                buf[out] = if b == b'\r' { b'\n' } else { b };
                out += 1;
            }

            // 只讀到被吞掉的 \n 時繼續讀，避免回傳 0 被當成 EOF
            if out > 0 {
                return Ok(out);
            }
        }
    }
}

fn text(row: &StringRecord, index: usize) -> String {
    row.get(index).map(str::trim).unwrap_or_default().to_string()
}

fn flag(row: &StringRecord, index: usize) -> bool {
    row.get(index) == Some(FLAG_MARK)
}

/// Converts a CityHeaven export into the cast import CSV.
#[derive(Debug, Clone, Default)]
pub struct CityHeavenConverter {
    layout: SourceLayout,
    columns: HashMap<String, String>,
}

impl CityHeavenConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the given fields by header title instead of by position.
    pub fn with_columns(mut self, columns: HashMap<String, String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_layout(mut self, layout: SourceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Returns `None` when the row is not publicly listed or has no name.
    pub fn extract(layout: &SourceLayout, row: &StringRecord) -> Option<ExtractedCast> {
        if row.len() < layout.min_fields() || !flag(row, layout.visible) {
            return None;
        }

        let name = text(row, layout.name);
        if name.is_empty() {
            return None;
        }

        let shop_comment = text(row, layout.shop_comment);
        let self_comment = text(row, layout.self_comment);

        Some(ExtractedCast {
            name,
            age: text(row, layout.age),
            height: text(row, layout.height),
            weight: text(row, layout.weight),
            bust: text(row, layout.bust),
            waist: text(row, layout.waist),
            hip: text(row, layout.hip),
            cup_size: text(row, layout.cup_size),
            blood_type: text(row, layout.blood_type),
            hobby: text(row, layout.hobby),
            profile: compose_profile(&shop_comment, &self_comment),
            is_new: flag(row, layout.is_new),
            smoking_ok: flag(row, layout.smoking_ok),
        })
    }

    /// Streams `input` into `output`. The first source line is treated as the header.
    ///
    /// Blank lines count as skipped rows, the same as short rows.
    pub fn convert<R: Read, W: Write>(&self, input: R, mut output: W) -> Result<ConversionStats> {
        // 補一個結尾換行，讓最後一列一定有終止符
        let source = UniversalNewlines::new(input.chain(&b"\n"[..]));
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(source);

        let mut raw = ByteRecord::new();
        if !reader.read_byte_record(&mut raw)? {
            return Err(EtlError::EmptySourceError);
        }
        let header = StringRecord::from_byte_record_lossy(raw.clone());

        let layout = self.layout.bind_headers(&header, &self.columns)?;
        if header.len() < layout.width() {
            tracing::warn!(
                "Source header has {} columns, layout expects {}; short rows fall back to empty fields",
                header.len(),
                layout.width()
            );
        }

        output.write_all(UTF8_BOM)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(output);
        writer.write_record(CAST_COLUMNS)?;

        let mut stats = ConversionStats::default();
        let mut row_num = 1usize;
        let mut line = reader.position().line();

        while reader.read_byte_record(&mut raw)? {
            let next_line = reader.position().line();
            let blanks = blank_lines_before(line, next_line, &raw);
            line = next_line;

            for _ in 0..blanks {
                row_num += 1;
                tracing::warn!("Row {}: blank line, skipping", row_num);
                stats.skipped += 1;
            }
            row_num += 1;

            let row = match StringRecord::from_byte_record(raw.clone()) {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Row {}: failed to read ({}), skipping", row_num, e);
                    stats.skipped += 1;
                    continue;
                }
            };

            match Self::extract(&layout, &row) {
                Some(cast) => {
                    writer.serialize(CastRecord::from_extracted(cast))?;
                    stats.converted += 1;
                }
                None => {
                    tracing::debug!("Row {}: not listed or unnamed, skipping", row_num);
                    stats.skipped += 1;
                }
            }
        }

        // 檔尾的空行；扣掉上面補的那一個換行
        let trailing = (reader.position().line() - line).saturating_sub(1);
        for _ in 0..trailing {
            row_num += 1;
            tracing::warn!("Row {}: blank line, skipping", row_num);
            stats.skipped += 1;
        }

        writer.flush()?;
        Ok(stats)
    }

    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<ConversionStats> {
        let source = BufReader::new(File::open(input)?);
        let target = BufWriter::new(File::create(output)?);
        self.convert(source, target)
    }
}
