use std::collections::BTreeMap;
use std::path::PathBuf;

use idcard_core::{ExtractionResult, Field};
use image::RgbaImage;

pub const TITLE: &str = "주민등록증 정보 추출기";
/// Characters per row of a field; longer values wrap (address only).
const FIELD_WIDTH: usize = 50;

/// Image currently shown in the preview pane.
#[derive(Debug, Clone)]
pub struct Preview {
    pub source: PathBuf,
    pub image: RgbaImage,
}

/// The five-field display surface. Holds whatever was last loaded successfully.
#[derive(Debug, Default)]
pub struct IdCardForm {
    preview: Option<Preview>,
    values: BTreeMap<Field, String>,
}

impl IdCardForm {
    /// Replace the preview and clear + repopulate every field.
    pub fn show(&mut self, preview: Preview, result: &ExtractionResult) {
        self.preview = Some(preview);
        self.values.clear();
        for field in Field::ALL {
            self.values.insert(field, result.display_value(field).to_string());
        }
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn render(&self) -> String {
        let mut out = format!("{TITLE}\n");
        match &self.preview {
            Some(p) => out.push_str(&format!(
                "[미리보기] {} ({}x{})\n",
                p.source.display(),
                p.image.width(),
                p.image.height()
            )),
            None => out.push_str("[미리보기] -\n"),
        }

        let label_width = Field::ALL.iter().map(|f| f.label().chars().count()).max().unwrap_or(0);
        for field in Field::ALL {
            let label = field.label();
            let pad = " ".repeat(label_width - label.chars().count());
            let rows = if field.is_multiline() {
                wrap(self.value(field), FIELD_WIDTH)
            } else {
                vec![self.value(field).to_string()]
            };
            for (n, row) in rows.iter().enumerate() {
                if n == 0 {
                    out.push_str(&format!("{label}{pad} : {row}\n"));
                } else {
                    out.push_str(&format!("{}   {row}\n", " ".repeat(label_width)));
                }
            }
        }
        out
    }
}

/// Greedy word wrap on whitespace; words longer than `width` get their own row.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if !current.is_empty() && needed > width {
            rows.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}
