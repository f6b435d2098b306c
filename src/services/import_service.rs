//! Bulk candidate import with historical round replay.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use crate::database::repositories::{ReplayBatch, ReplayRound};
use crate::database::Repositories;
use crate::dto::import_dto::{
    ColumnMapping, CsvImportPayload, ImportCandidateRow, ImportPayload, ImportRound, ImportSummary,
};
use crate::error::{Error, Result};
use crate::models::audit_log::{AuditAction, EntityType};
use crate::models::candidate::{Candidate, CandidateProfile, CandidateStatus};
use crate::models::feedback::{Feedback, FeedbackResult};
use crate::models::interview::Interview;
use crate::models::user::{Actor, User};
use crate::pipeline::{candidate_transition, CandidateEvent};
use crate::services::audit_service::AuditService;
use crate::services::campaign_service::load_active_campaign;
use crate::utils::validation::{clean_optional, normalize_email};

/// A row that survived normalization, remembering its 1-based position in
/// the upload for warnings.
#[derive(Debug, Clone)]
struct PreparedRow {
    line: usize,
    profile: CandidateProfile,
    rounds: Vec<ImportRound>,
}

#[derive(Clone)]
pub struct ImportService {
    repos: Repositories,
    audit: AuditService,
}

impl ImportService {
    pub fn new(repos: Repositories, audit: AuditService) -> Self {
        Self { repos, audit }
    }

    /// Parses an uploaded CSV with an explicit column mapping, then imports it.
    pub async fn import_csv(
        &self,
        actor: &Actor,
        campaign_id: Uuid,
        payload: CsvImportPayload,
    ) -> Result<ImportSummary> {
        actor.require_admin("import candidates")?;
        payload.validate()?;
        let rows = parse_csv(&payload.csv, &payload.mapping)?;
        if rows.is_empty() {
            return Err(Error::BadRequest("CSV contains no data rows".to_string()));
        }
        self.import(actor, campaign_id, ImportPayload { rows }).await
    }

    pub async fn import(
        &self,
        actor: &Actor,
        campaign_id: Uuid,
        payload: ImportPayload,
    ) -> Result<ImportSummary> {
        actor.require_admin("import candidates")?;
        payload.validate()?;
        load_active_campaign(&self.repos, campaign_id).await?;

        let mut summary = ImportSummary::default();
        let now = Utc::now();
        let rows = prepare_rows(payload.rows, &mut summary);

        let candidates: Vec<Candidate> = rows
            .iter()
            .map(|row| Candidate::new(campaign_id, row.profile.clone(), now))
            .collect();
        let inserted = self
            .repos
            .candidates
            .insert_candidates_skipping_duplicates(&candidates)
            .await?;
        summary.created = inserted.len();
        summary.skipped_duplicates += candidates.len() - inserted.len();

        let with_rounds: Vec<&PreparedRow> = rows.iter().filter(|r| !r.rounds.is_empty()).collect();
        if !with_rounds.is_empty() {
            self.replay(campaign_id, &with_rounds, now, &mut summary).await?;
        }

        for warning in &summary.warnings {
            tracing::warn!(campaign_id = %campaign_id, "{}", warning);
        }
        tracing::info!(
            campaign_id = %campaign_id,
            created = summary.created,
            skipped = summary.skipped_duplicates,
            interviews = summary.interviews_created,
            warnings = summary.warnings.len(),
            "Bulk import finished"
        );
        self.audit
            .log(
                actor,
                AuditAction::CandidateBulkUpload,
                EntityType::Campaign,
                campaign_id,
                Some(json!({
                    "created": summary.created,
                    "skipped_duplicates": summary.skipped_duplicates,
                    "interviews_created": summary.interviews_created,
                    "warnings": summary.warnings.len(),
                })),
            )
            .await;
        Ok(summary)
    }

    /// Replays historical rounds, one atomic batch per candidate.
    async fn replay(
        &self,
        campaign_id: Uuid,
        rows: &[&PreparedRow],
        now: DateTime<Utc>,
        summary: &mut ImportSummary,
    ) -> Result<()> {
        let emails: Vec<String> = rows.iter().map(|r| r.profile.email.clone()).collect();
        let candidates: HashMap<String, Candidate> = self
            .repos
            .candidates
            .find_by_emails(campaign_id, &emails)
            .await?
            .into_iter()
            .map(|c| (c.email.clone(), c))
            .collect();

        let interviewer_emails: Vec<String> = rows
            .iter()
            .flat_map(|r| r.rounds.iter())
            .map(|round| normalize_email(&round.interviewer_email))
            .filter(|e| !e.is_empty())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let interviewers: HashMap<String, User> = self
            .repos
            .users
            .find_users_by_emails(&interviewer_emails)
            .await?
            .into_iter()
            .map(|u| (u.email.clone(), u))
            .collect();

        for row in rows {
            let Some(candidate) = candidates.get(&row.profile.email) else {
                summary.warnings.push(format!(
                    "Row {}: candidate {} was not imported, its rounds were skipped",
                    row.line, row.profile.email
                ));
                continue;
            };

            let mut batch = ReplayBatch {
                candidate_id: candidate.id,
                rounds: Vec::new(),
                final_status: None,
                at: now,
            };
            let mut last_result = None;
            for (idx, round) in row.rounds.iter().enumerate() {
                let email = normalize_email(&round.interviewer_email);
                let Some(interviewer) = interviewers.get(&email) else {
                    summary.warnings.push(format!(
                        "Row {}, round {}: interviewer '{}' not found, round skipped",
                        row.line,
                        idx + 1,
                        round.interviewer_email.trim()
                    ));
                    continue;
                };
                let Some(result) = FeedbackResult::from_token(&round.result) else {
                    summary.warnings.push(format!(
                        "Row {}, round {}: invalid result '{}', round skipped",
                        row.line,
                        idx + 1,
                        round.result.trim()
                    ));
                    continue;
                };

                let interview = Interview::replayed(candidate.id, interviewer.id, now);
                let feedback = Feedback::new(
                    interview.id,
                    result,
                    round.feedback.as_deref().map(str::trim).unwrap_or_default().to_string(),
                    None,
                    vec![],
                    now,
                );
                batch.rounds.push(ReplayRound {
                    interviewer_email: email,
                    interview,
                    feedback,
                });
                last_result = Some(result);
            }

            if batch.rounds.is_empty() {
                continue;
            }
            batch.final_status = last_result.and_then(replayed_status);

            let outcome = self.repos.interviews.replay_history(&batch).await?;
            summary.interviews_created += outcome.created;
            for email in outcome.duplicate_interviewers {
                summary.warnings.push(format!(
                    "Row {}: candidate {} already has an interview with {}, round skipped",
                    row.line, row.profile.email, email
                ));
            }
        }
        Ok(())
    }
}

/// Candidate status implied by the last replayed round, if it moves the
/// candidate out of the pipeline.
fn replayed_status(result: FeedbackResult) -> Option<CandidateStatus> {
    let next = candidate_transition(
        CandidateStatus::InPipeline,
        CandidateEvent::InterviewConcluded(result),
    )
    .ok()?;
    (next != CandidateStatus::InPipeline).then_some(next)
}

/// Normalizes identity fields, drops rows without a usable name or email and
/// folds repeated (name, email) pairs into their first occurrence.
fn prepare_rows(rows: Vec<ImportCandidateRow>, summary: &mut ImportSummary) -> Vec<PreparedRow> {
    let mut seen = HashSet::new();
    let mut prepared = Vec::with_capacity(rows.len());

    for (idx, row) in rows.into_iter().enumerate() {
        let line = idx + 1;
        let name = row.name.trim().to_string();
        let email = normalize_email(&row.email);
        if name.is_empty() || email.is_empty() {
            summary
                .warnings
                .push(format!("Row {}: name and email are required, row skipped", line));
            continue;
        }
        if !email.validate_email() {
            summary
                .warnings
                .push(format!("Row {}: invalid email '{}', row skipped", line, email));
            continue;
        }
        if !seen.insert((name.to_lowercase(), email.clone())) {
            summary.skipped_duplicates += 1;
            continue;
        }

        let rounds = row
            .rounds
            .into_iter()
            .filter(|r| !(r.interviewer_email.trim().is_empty() && r.result.trim().is_empty()))
            .collect();
        prepared.push(PreparedRow {
            line,
            profile: CandidateProfile {
                name,
                email,
                phone: clean_optional(row.phone),
                college: clean_optional(row.college),
                department: clean_optional(row.department),
                resume_link: clean_optional(row.resume_link),
                current_role: clean_optional(row.current_role),
            },
            rounds,
        });
    }
    prepared
}

/// Turns CSV text into import rows using the header names in `mapping`.
pub fn parse_csv(text: &str, mapping: &ColumnMapping) -> Result<Vec<ImportCandidateRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| (h.trim().to_lowercase(), idx))
        .collect();
    let column = |name: &str| -> Result<usize> {
        headers
            .get(&name.trim().to_lowercase())
            .copied()
            .ok_or_else(|| Error::BadRequest(format!("CSV is missing mapped column '{}'", name)))
    };
    let optional_column = |name: &Option<String>| -> Result<Option<usize>> {
        name.as_deref().map(|n| column(n)).transpose()
    };

    let name_idx = column(&mapping.name)?;
    let email_idx = column(&mapping.email)?;
    let phone_idx = optional_column(&mapping.phone)?;
    let college_idx = optional_column(&mapping.college)?;
    let department_idx = optional_column(&mapping.department)?;
    let resume_idx = optional_column(&mapping.resume_link)?;
    let role_idx = optional_column(&mapping.current_role)?;
    let round_idx = mapping
        .rounds
        .iter()
        .map(|r| {
            Ok((
                column(&r.interviewer_email)?,
                column(&r.result)?,
                optional_column(&r.feedback)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        let optional_cell = |idx: Option<usize>| idx.map(cell).filter(|s| !s.is_empty());

        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(ImportCandidateRow {
            name: cell(name_idx),
            email: cell(email_idx),
            phone: optional_cell(phone_idx),
            college: optional_cell(college_idx),
            department: optional_cell(department_idx),
            resume_link: optional_cell(resume_idx),
            current_role: optional_cell(role_idx),
            rounds: round_idx
                .iter()
                .map(|(interviewer, result, feedback)| ImportRound {
                    interviewer_email: cell(*interviewer),
                    result: cell(*result),
                    feedback: optional_cell(*feedback),
                })
                .filter(|r| !(r.interviewer_email.is_empty() && r.result.is_empty()))
                .collect(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::import_dto::RoundColumns;

    fn mapping() -> ColumnMapping {
        ColumnMapping {
            name: "Full Name".into(),
            email: "Email".into(),
            phone: Some("Phone".into()),
            college: None,
            department: None,
            resume_link: None,
            current_role: None,
            rounds: vec![
                RoundColumns {
                    interviewer_email: "R1 Interviewer".into(),
                    result: "R1 Result".into(),
                    feedback: Some("R1 Notes".into()),
                },
                RoundColumns {
                    interviewer_email: "R2 Interviewer".into(),
                    result: "R2 Result".into(),
                    feedback: None,
                },
            ],
        }
    }

    #[test]
    fn parses_mapped_columns_and_skips_blank_rounds() {
        let csv = "Full Name,Email,Phone,R1 Interviewer,R1 Result,R1 Notes,R2 Interviewer,R2 Result\n\
                   Asha Rao,asha@x.io,99001,iv@x.io,weak hire,\"solid, but slow\",,\n\
                   Ben Li,ben@x.io,,,,,,\n";
        let rows = parse_csv(csv, &mapping()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].phone.as_deref(), Some("99001"));
        assert_eq!(rows[0].rounds.len(), 1);
        assert_eq!(rows[0].rounds[0].result, "weak hire");
        assert_eq!(rows[0].rounds[0].feedback.as_deref(), Some("solid, but slow"));
        assert!(rows[1].rounds.is_empty());
        assert_eq!(rows[1].phone, None);
    }

    #[test]
    fn missing_mapped_header_is_rejected() {
        let csv = "Full Name,Email\nAsha,asha@x.io\n";
        let err = parse_csv(csv, &mapping()).unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg.contains("Phone")));
    }

    #[test]
    fn rows_are_normalized_and_deduplicated() {
        let mut summary = ImportSummary::default();
        let rows = vec![
            ImportCandidateRow {
                name: " Asha ".into(),
                email: "ASHA@x.io ".into(),
                ..Default::default()
            },
            ImportCandidateRow {
                name: "asha".into(),
                email: "asha@x.io".into(),
                ..Default::default()
            },
            ImportCandidateRow {
                name: "".into(),
                email: "ghost@x.io".into(),
                ..Default::default()
            },
        ];
        let prepared = prepare_rows(rows, &mut summary);
        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared[0].profile.email, "asha@x.io");
        assert_eq!(summary.skipped_duplicates, 1);
        assert_eq!(summary.warnings.len(), 1);
    }

    #[test]
    fn last_round_decides_the_replayed_status() {
        assert_eq!(replayed_status(FeedbackResult::NoHire), Some(CandidateStatus::Rejected));
        assert_eq!(replayed_status(FeedbackResult::NoShow), Some(CandidateStatus::NoShow));
        assert_eq!(replayed_status(FeedbackResult::Hire), None);
        assert_eq!(replayed_status(FeedbackResult::WeakHire), None);
    }
}
