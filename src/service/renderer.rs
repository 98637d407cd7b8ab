//! 发票文档渲染
//!
//! 固定版式: 标题 -> 客户标量字段 -> 明细行 -> 合计与备注, A4 纸张, 超出一页自动分页。
//! 文件名由客户名派生; 同一批次内重名时追加数字后缀 (`_2`, `_3`, ...)。

use crate::error::{PipelineError, Result};
use crate::models::{
    InvoiceField, InvoiceRecord, ModelDescriptor, RenderFailure, RenderReport, RenderedDocument,
    DOCUMENT_PLACEHOLDER,
};
use crate::store;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A4 (pt)
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const LINE_HEIGHT: i64 = 18;
const BODY_FONT_SIZE: i64 = 12;
const TITLE_FONT_SIZE: i64 = 16;
/// Helvetica 12pt 在 495pt 版心内大约容纳的字符数
const WRAP_WIDTH: usize = 90;

pub const TITLE: &str = "Rechnung";
pub const NO_PRODUCTS_LINE: &str = "Keine Produkte angegeben.";

const HEADER_FIELDS: [InvoiceField; 6] = [
    InvoiceField::Name,
    InvoiceField::Address,
    InvoiceField::Phone,
    InvoiceField::Email,
    InvoiceField::InvoiceNumber,
    InvoiceField::InvoiceDate,
];
const FOOTER_FIELDS: [InvoiceField; 3] = [
    InvoiceField::TotalAmount,
    InvoiceField::PaymentDue,
    InvoiceField::Comments,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Body,
}

/// 版面中的一行; 空文本表示空行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub style: LineStyle,
}

impl Line {
    fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: LineStyle::Body,
        }
    }

    fn blank() -> Self {
        Self::body("")
    }
}

/// 生成版面行 (未分页)
pub fn layout(record: &InvoiceRecord) -> Vec<Line> {
    let mut lines = vec![
        Line {
            text: TITLE.to_string(),
            style: LineStyle::Title,
        },
        Line::blank(),
    ];

    for field in HEADER_FIELDS {
        push_wrapped(
            &mut lines,
            &format!("{}: {}", field.label(), record.value_or(field, DOCUMENT_PLACEHOLDER)),
        );
    }

    lines.push(Line::blank());
    lines.push(Line::body("Produkte:"));
    if record.products.is_empty() {
        lines.push(Line::body(NO_PRODUCTS_LINE));
    }
    for item in &record.products {
        push_wrapped(
            &mut lines,
            &format!(
                "- {} (Menge: {}, Einzelpreis: {} EUR, Gesamt: {} EUR)",
                item.name_or(DOCUMENT_PLACEHOLDER),
                item.quantity,
                item.unit_price,
                item.total
            ),
        );
    }

    lines.push(Line::blank());
    for field in FOOTER_FIELDS {
        push_wrapped(
            &mut lines,
            &format!("{}: {}", field.label(), record.value_or(field, DOCUMENT_PLACEHOLDER)),
        );
    }
    lines
}

fn push_wrapped(lines: &mut Vec<Line>, text: &str) {
    for part in textwrap::wrap(text, WRAP_WIDTH) {
        lines.push(Line::body(part.into_owned()));
    }
}

/// 每页可容纳的行数
pub fn lines_per_page() -> usize {
    ((PAGE_HEIGHT - 2 * MARGIN) / LINE_HEIGHT) as usize
}

pub fn paginate(lines: Vec<Line>) -> Vec<Vec<Line>> {
    let per_page = lines_per_page();
    let mut pages: Vec<Vec<Line>> = lines.chunks(per_page).map(|c| c.to_vec()).collect();
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    pages
}

/// Helvetica 使用 WinAnsiEncoding; 无法表示的字符替换为 '?'
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

fn font(base: &str) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(base.as_bytes().to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ])
}

fn page_operations(lines: &[Line]) -> Vec<Operation> {
    let mut ops = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;
    for line in lines {
        if !line.text.is_empty() {
            let (font_name, size) = match line.style {
                LineStyle::Title => (&b"F2"[..], TITLE_FONT_SIZE),
                LineStyle::Body => (&b"F1"[..], BODY_FONT_SIZE),
            };
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![Object::Name(font_name.to_vec()), Object::Integer(size)],
            ));
            ops.push(Operation::new(
                "Td",
                vec![Object::Integer(MARGIN), Object::Integer(y)],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(&line.text),
                    StringFormat::Hexadecimal,
                )],
            ));
            ops.push(Operation::new("ET", vec![]));
        }
        y -= LINE_HEIGHT;
    }
    ops
}

/// 构建 PDF 字节流
pub fn build_pdf(pages: &[Vec<Line>]) -> std::result::Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![
            ("F1", Object::Reference(regular_id)),
            ("F2", Object::Reference(bold_id)),
        ])),
    )]));

    let mut page_ids = Vec::with_capacity(pages.len());
    for lines in pages {
        let content = Content {
            operations: page_operations(lines),
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
        ("Resources", Object::Reference(resources_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ]),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// 客户名 -> 安全文件名 (`<name>_invoice.pdf`)
pub fn document_file_name(customer_name: &str) -> String {
    let cleaned: String = customer_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let stem = if cleaned.is_empty() {
        DOCUMENT_PLACEHOLDER.replace(' ', "_")
    } else {
        cleaned.to_string()
    };
    format!("{}_invoice.pdf", stem)
}

/// 批次内文件名分配, 重名时追加数字后缀
#[derive(Debug, Default)]
pub struct FileNameAllocator {
    used: HashSet<String>,
}

impl FileNameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, customer_name: &str) -> String {
        let base = document_file_name(customer_name);
        if self.used.insert(base.clone()) {
            return base;
        }
        let stem = base.trim_end_matches(".pdf");
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}.pdf", stem, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// 文档渲染器, 输出到固定目录
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    output_dir: PathBuf,
}

impl DocumentRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 渲染单条记录到指定路径 (原子写入)
    pub fn render(&self, record: &InvoiceRecord, path: &Path) -> Result<()> {
        let name = record.value_or(InvoiceField::Name, DOCUMENT_PLACEHOLDER);
        let render_err = |reason: String| PipelineError::Render {
            name: name.to_string(),
            reason,
        };

        let pages = paginate(layout(record));
        let bytes = build_pdf(&pages).map_err(|e| render_err(e.to_string()))?;
        store::write_atomic(path, &bytes).map_err(|e| render_err(e.to_string()))?;

        tracing::info!("PDF für {} erstellt: {}", name, path.display());
        Ok(())
    }

    /// 批量渲染: 单条失败只记录并计数, 继续处理其余记录
    pub fn render_batch(&self, records: &[InvoiceRecord]) -> RenderReport {
        let mut report = RenderReport::default();
        if let Err(e) = store::ensure_dir(&self.output_dir) {
            tracing::error!("Ausgabeverzeichnis kann nicht angelegt werden: {}", e);
            report.failures = records
                .iter()
                .enumerate()
                .map(|(index, r)| RenderFailure {
                    index,
                    name: r.value_or(InvoiceField::Name, DOCUMENT_PLACEHOLDER).to_string(),
                    reason: e.to_string(),
                })
                .collect();
            return report;
        }

        let mut names = FileNameAllocator::new();
        for (index, record) in records.iter().enumerate() {
            let file_name = names.allocate(&record.name);
            let path = self.output_dir.join(&file_name);
            match self.render(record, &path) {
                Ok(()) => report.documents.push(RenderedDocument {
                    invoice_number: record.invoice_number.clone(),
                    file_name,
                    path,
                }),
                Err(e) => {
                    tracing::error!("Fehler beim Erstellen des PDFs (Datensatz {}): {}", index, e);
                    report.failures.push(RenderFailure {
                        index,
                        name: record
                            .value_or(InvoiceField::Name, DOCUMENT_PLACEHOLDER)
                            .to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "{} PDFs erstellt, {} fehlgeschlagen",
            report.documents.len(),
            report.failure_count()
        );
        report
    }

    /// 渲染模型描述中的示例记录
    pub fn render_exemplar(&self, model: &ModelDescriptor, path: &Path) -> Result<()> {
        self.render(&model.example.label, path)
    }
}
