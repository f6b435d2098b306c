use rust_xlsxwriter::*;
use serde::Serialize;
use uuid::Uuid;

use crate::database::Repositories;
use crate::error::{Error, Result};
use crate::models::campaign::Campaign;
use crate::pipeline::{CandidateAggregate, DisplayStatus};
use crate::services::campaign_service::{load_aggregates, load_campaign};

pub const EXPORT_HEADERS: [&str; 9] = [
    "name",
    "email",
    "phone",
    "college",
    "department",
    "status",
    "current_role",
    "hired_role",
    "round",
];

/// One exported candidate line. `status` is the display status and `round`
/// the current round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub department: String,
    pub status: DisplayStatus,
    pub current_role: String,
    pub hired_role: String,
    pub round: u32,
}

impl From<&CandidateAggregate> for ExportRow {
    fn from(aggregate: &CandidateAggregate) -> Self {
        let c = &aggregate.candidate;
        Self {
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone().unwrap_or_default(),
            college: c.college.clone().unwrap_or_default(),
            department: c.department.clone().unwrap_or_default(),
            status: aggregate.display_status(),
            current_role: c.current_role.clone().unwrap_or_default(),
            hired_role: c.hired_role.clone().unwrap_or_default(),
            round: aggregate.current_round(),
        }
    }
}

#[derive(Clone)]
pub struct ExportService {
    repos: Repositories,
}

impl ExportService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn campaign_rows(&self, campaign_id: Uuid) -> Result<(Campaign, Vec<ExportRow>)> {
        let campaign = load_campaign(&self.repos, campaign_id).await?;
        let aggregates = load_aggregates(&self.repos, campaign_id).await?;
        Ok((campaign, aggregates.iter().map(ExportRow::from).collect()))
    }

    pub async fn campaign_csv(&self, campaign_id: Uuid) -> Result<Vec<u8>> {
        let (_, rows) = self.campaign_rows(campaign_id).await?;
        Self::generate_csv(&rows)
    }

    pub async fn campaign_xlsx(&self, campaign_id: Uuid) -> Result<Vec<u8>> {
        let (campaign, rows) = self.campaign_rows(campaign_id).await?;
        Self::generate_xlsx(&campaign, &rows)
    }

    /// Standard CSV: cells holding a comma, quote or newline are quoted with
    /// inner quotes doubled.
    pub fn generate_csv(rows: &[ExportRow]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(Vec::new());
        writer.write_record(EXPORT_HEADERS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| Error::Internal(format!("CSV export failed: {}", e)))
    }

    /// Styled workbook with the same columns as the CSV export.
    pub fn generate_xlsx(campaign: &Campaign, rows: &[ExportRow]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Candidates")?;

        let primary_color = Color::RGB(0x1E293B);
        let header_bg = Color::RGB(0x0F172A);
        let alt_row = Color::RGB(0xF8FAFC);
        let border_color = Color::RGB(0xE2E8F0);

        let widths = [28.0, 32.0, 16.0, 28.0, 20.0, 22.0, 22.0, 22.0, 8.0];
        for (i, width) in widths.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }
        let last_col = (EXPORT_HEADERS.len() - 1) as u16;

        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 36)?;
        let title = format!("{} ({}, {})", campaign.name, campaign.campaign_type, campaign.status);
        worksheet.merge_range(0, 0, 0, last_col, &title, &title_format)?;

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let header_row = 1;
        worksheet.set_row_height(header_row, 24)?;
        for (i, name) in EXPORT_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        let data_start_row = 2;
        for (idx, row) in rows.iter().enumerate() {
            let r = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row } else { Color::White };
            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
            let status_fmt = Format::new()
                .set_font_size(10)
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(status_color(row.status))
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);

            worksheet.write_string_with_format(r, 0, &row.name, &base_fmt.clone().set_bold())?;
            worksheet.write_string_with_format(r, 1, &row.email, &base_fmt)?;
            worksheet.write_string_with_format(r, 2, &row.phone, &base_fmt)?;
            worksheet.write_string_with_format(r, 3, &row.college, &base_fmt)?;
            worksheet.write_string_with_format(r, 4, &row.department, &base_fmt)?;
            worksheet.write_string_with_format(r, 5, row.status.to_string(), &status_fmt)?;
            worksheet.write_string_with_format(r, 6, &row.current_role, &base_fmt)?;
            worksheet.write_string_with_format(r, 7, &row.hired_role, &base_fmt)?;
            worksheet.write_number_with_format(r, 8, row.round as f64, &center_fmt)?;
        }

        worksheet.set_freeze_panes(data_start_row, 0)?;
        let last_row = (data_start_row + rows.len() as u32).saturating_sub(1).max(header_row);
        worksheet.autofilter(header_row, 0, last_row, last_col)?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}

fn status_color(status: DisplayStatus) -> Color {
    match status {
        DisplayStatus::InPipeline => Color::RGB(0x3B82F6),
        DisplayStatus::InterviewScheduled => Color::RGB(0x8B5CF6),
        DisplayStatus::InterviewOngoing => Color::RGB(0xF59E0B),
        DisplayStatus::Selected => Color::RGB(0x10B981),
        DisplayStatus::Rejected => Color::RGB(0xEF4444),
        DisplayStatus::NoShow => Color::RGB(0x64748B),
    }
}
