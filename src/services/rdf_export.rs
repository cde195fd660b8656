//! RDF export assembly
//!
//! Concatenates the Turtle payloads of analysis records into one download.
//! Every file is introduced by a `##filename: <name>.ttl` comment line so the
//! bundle stays valid Turtle and can be split back into its parts.

use bytes::{BufMut, Bytes, BytesMut};

use crate::domain::{AnalysisRecord, OrderId, OrderIdentity};

/// Prefix of the comment line that introduces each file in a bundle
pub const FILE_HEADER_PREFIX: &str = "##filename: ";

/// Written between two consecutive files
pub const FILE_SEPARATOR: &[u8] = b"\n\n";

pub const FILE_EXTENSION: &str = ".ttl";

/// Result of assembling an export
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RdfDownload {
    /// `None` when no record carried a payload
    pub content: Option<Bytes>,
    pub file_count: usize,
}

/// Type tag leading a download filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Order,
    OrderMetric,
    Metric,
    Experts,
    Statistics,
    Analyses,
}

impl DownloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadKind::Order => "order",
            DownloadKind::OrderMetric => "order_metric",
            DownloadKind::Metric => "metric",
            DownloadKind::Experts => "experts",
            DownloadKind::Statistics => "statistics",
            DownloadKind::Analyses => "analyses",
        }
    }
}

/// Name of a single file inside a bundle, without extension
pub fn file_separator_name(record: &AnalysisRecord) -> String {
    match &record.order {
        Some(order) => format!(
            "order_{}_{}_{}_{}_{}",
            record.order_id,
            order.owner,
            order.repository,
            record.metric_id,
            record.kind.label()
        ),
        None => format!("{}_{}_{}", record.metric_id, record.id, record.kind.label()),
    }
}

/// Concatenate the payloads of `records` in input order.
///
/// Records without loaded payload bytes are skipped and not counted.
pub fn create_rdf_download(records: &[AnalysisRecord], base_filename_hint: &str) -> RdfDownload {
    let mut buffer = BytesMut::new();
    let mut file_count = 0;

    for record in records {
        let Some(payload) = record.rdf.bytes().filter(|bytes| !bytes.is_empty()) else {
            continue;
        };

        if file_count > 0 {
            buffer.put_slice(FILE_SEPARATOR);
        }

        buffer.put_slice(FILE_HEADER_PREFIX.as_bytes());
        buffer.put_slice(file_separator_name(record).as_bytes());
        buffer.put_slice(FILE_EXTENSION.as_bytes());
        buffer.put_u8(b'\n');
        buffer.put_slice(payload);
        file_count += 1;
    }

    tracing::debug!(
        export = base_filename_hint,
        records = records.len(),
        file_count,
        bytes = buffer.len(),
        "Assembled RDF export"
    );

    if file_count == 0 {
        return RdfDownload { content: None, file_count: 0 };
    }

    RdfDownload { content: Some(buffer.freeze()), file_count }
}

/// Build the attachment filename of a download:
/// `<type>[_order_<id>][_<owner>_<repository>][_metric_<metricId>].ttl`
pub fn download_filename(
    kind: DownloadKind,
    order_id: Option<OrderId>,
    metric_id: Option<&str>,
    order: Option<&OrderIdentity>,
) -> String {
    let mut filename = kind.as_str().to_string();

    if let Some(id) = order_id {
        filename.push_str(&format!("_order_{}", id));
    }
    if let Some(order) = order {
        filename.push_str(&format!("_{}_{}", order.owner, order.repository));
    }
    if let Some(metric_id) = metric_id {
        filename.push_str(&format!("_metric_{}", metric_id));
    }

    filename.push_str(FILE_EXTENSION);
    filename
}
