//! CSV export and import of enquiries.
//!
//! Both directions share one header row. Export leaves `BalanceAmount` and
//! `PaymentStatus` blank for lost enquiries. Import ignores the three
//! derived columns: payments are not part of the file, so the ledger is
//! recomputed from the fee alone.

use std::{io, str::FromStr};

use engine::{EngineError, Enquiry, EnquiryStatus, Money};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const HEADERS: [&str; 13] = [
    "Name",
    "Phone",
    "Course",
    "Experience",
    "WorkingIn",
    "LearningMode",
    "Source",
    "Status",
    "Attender",
    "CourseFee",
    "PaidAmount",
    "BalanceAmount",
    "PaymentStatus",
];

#[derive(Serialize)]
struct ExportRow<'a> {
    name: &'a str,
    phone: &'a str,
    course: &'a str,
    experience: &'static str,
    working_in: &'static str,
    learning_mode: &'static str,
    source: &'static str,
    status: &'static str,
    attender: &'a str,
    course_fee: Money,
    paid_amount: Money,
    balance_amount: Option<Money>,
    payment_status: Option<&'static str>,
}

impl<'a> From<&'a Enquiry> for ExportRow<'a> {
    fn from(enquiry: &'a Enquiry) -> Self {
        let lost = enquiry.status == Some(EnquiryStatus::Loss);
        Self {
            name: &enquiry.name,
            phone: &enquiry.phone,
            course: enquiry.course.trim(),
            experience: enquiry.experience.map(|v| v.as_str()).unwrap_or_default(),
            working_in: enquiry.working_in.map(|v| v.as_str()).unwrap_or_default(),
            learning_mode: enquiry.learning_mode.map(|v| v.as_str()).unwrap_or_default(),
            source: enquiry.source.map(|v| v.as_str()).unwrap_or_default(),
            status: enquiry.status.map(|v| v.as_str()).unwrap_or_default(),
            attender: &enquiry.attender,
            course_fee: enquiry.course_fee,
            paid_amount: enquiry.paid_amount,
            balance_amount: (!lost).then_some(enquiry.balance_amount),
            payment_status: (!lost).then_some(enquiry.payment_status.as_str()),
        }
    }
}

/// Write the enquiries matching `query` (name or phone) as CSV.
///
/// Returns the number of data rows written.
pub fn export_csv<W: io::Write>(
    writer: W,
    enquiries: &[Enquiry],
    query: Option<&str>,
) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADERS)?;

    let mut written = 0;
    for enquiry in enquiries
        .iter()
        .filter(|enquiry| query.is_none_or(|query| enquiry.matches_search(query)))
    {
        wtr.serialize(ExportRow::from(enquiry))?;
        written += 1;
    }
    wtr.flush()?;
    Ok(written)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImportRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Phone")]
    phone: String,
    #[serde(rename = "Course")]
    course: String,
    #[serde(rename = "Experience")]
    experience: String,
    #[serde(rename = "WorkingIn")]
    working_in: String,
    #[serde(rename = "LearningMode")]
    learning_mode: String,
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Attender")]
    attender: String,
    #[serde(rename = "CourseFee")]
    course_fee: String,
}

impl ImportRow {
    fn into_enquiry(self, row: usize) -> Result<Enquiry> {
        let mut enquiry = Enquiry::draft();
        enquiry.name = self.name.trim().to_string();
        enquiry.phone = self.phone.trim().to_string();
        enquiry.course = self.course.trim().to_string();
        enquiry.attender = self.attender.trim().to_string();
        enquiry.experience = cell(&self.experience, row)?;
        enquiry.working_in = cell(&self.working_in, row)?;
        enquiry.learning_mode = cell(&self.learning_mode, row)?;
        enquiry.source = cell(&self.source, row)?;
        if let Some(status) = cell(&self.status, row)? {
            enquiry.status = Some(status);
        }
        enquiry.course_fee = cell(&self.course_fee, row)?.unwrap_or(Money::ZERO);
        enquiry.refresh_ledger();
        Ok(enquiry)
    }
}

fn cell<T: FromStr<Err = EngineError>>(value: &str, row: usize) -> Result<Option<T>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|err: EngineError| AppError::Import {
        row,
        message: err.to_string(),
    })
}

/// Read enquiries from CSV with the export headers.
///
/// Blank cells become absent values; a blank status keeps the draft's
/// `Pending`. Rows are numbered from 1, header excluded.
pub fn import_csv<R: io::Read>(reader: R) -> Result<Vec<Enquiry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut enquiries = Vec::new();
    for (index, record) in rdr.deserialize::<ImportRow>().enumerate() {
        let row = index + 1;
        let record = record?;
        if record.name.is_empty() && record.phone.is_empty() {
            tracing::debug!(row, "skipping empty row");
            continue;
        }
        enquiries.push(record.into_enquiry(row)?);
    }
    Ok(enquiries)
}
