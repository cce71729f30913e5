use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use classplan_core::time::parse_timezone;
use classplan_core::{
    CoursePlan, CoursePlanExecutor, CreationGateway, DirectoryResolver, ItemOutcome, PlanDocument,
    PlanDraft, RunSummary, ScheduledDates, WorkKind, resolve_schedule,
};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::auth;
use crate::config::{Config, load_config};
use crate::dry_run::DryRunGateway;
use crate::google::GoogleClient;

const DATE_FMT: &str = "%a %Y-%m-%d %H:%M %Z";

/// JSON unless the file ends in `.toml`.
pub fn parse_document(path: &Path, content: &str) -> Result<PlanDocument> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let doc = if is_toml {
        PlanDocument::from_toml_str(content)
    } else {
        PlanDocument::from_json_str(content)
    };
    doc.with_context(|| format!("parsing {}", path.display()))
}

fn resolve_tz(cfg: &Config, timezone: Option<&str>) -> Result<Tz> {
    Ok(parse_timezone(timezone.unwrap_or(&cfg.schedule.timezone))?)
}

fn load_draft(path: &Path, tz: Tz) -> Result<PlanDraft> {
    let content = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let doc = parse_document(path, &content)?;
    PlanDraft::from_document(&doc, tz).with_context(|| format!("loading {}", path.display()))
}

pub async fn run(path: &Path, timezone: Option<&str>, dry_run: bool) -> Result<()> {
    let cfg = load_config()?;
    let tz = resolve_tz(&cfg, timezone)?;
    let draft = load_draft(path, tz)?;

    // Fail on a stale plan before the OAuth flow or any API call.
    let now = Utc::now();
    draft.ensure_future_start(now)?;

    let token = auth::access_token(&cfg).await?;
    let client = GoogleClient::new(&token, &cfg.google)?;
    let resolver = DirectoryResolver::new(&client, cfg.google.page_size);

    let plan = CoursePlan::load(draft, now, &resolver).await?;
    info!(
        course = plan.course_name(),
        course_id = %plan.course_id(),
        items = plan.items().len(),
        "course resolved"
    );

    let dry = DryRunGateway::default();
    let gateway: &dyn CreationGateway = if dry_run { &dry } else { &client };

    let mut executor = CoursePlanExecutor::new(resolver, gateway, cfg.executor_options());
    let summary = executor.run(&plan).await?;

    print!("{}", render_summary(&summary));
    if dry_run {
        println!("\n(dry run: {} payloads printed, nothing created)", dry.count());
    }
    Ok(())
}

pub fn preview(path: &Path, timezone: Option<&str>) -> Result<()> {
    let cfg = load_config()?;
    let tz = resolve_tz(&cfg, timezone)?;
    let draft = load_draft(path, tz)?;

    let schedule = resolve_schedule(draft.start_date, &draft.items)?;
    println!("# {} (starts {})\n", draft.course_name, draft.start_date.format(DATE_FMT));
    print!("{}", render_schedule(&schedule));
    Ok(())
}

pub fn normalize(path: &Path, timezone: Option<&str>) -> Result<()> {
    let cfg = load_config()?;
    let tz = resolve_tz(&cfg, timezone)?;
    let draft = load_draft(path, tz)?;
    println!("{}", serde_json::to_string_pretty(&draft.to_document())?);
    Ok(())
}

fn render_schedule(schedule: &[ScheduledDates]) -> String {
    let mut s = String::new();
    for (i, item) in schedule.iter().enumerate() {
        let due = match (item.kind, &item.due) {
            (WorkKind::Material, _) => String::new(),
            (WorkKind::Assignment, Some(due)) => format!(" | due {}", due.format(DATE_FMT)),
            (WorkKind::Assignment, None) => " | due MISSING".to_string(),
        };
        s.push_str(&format!(
            "{:>3}. [{}] {} | publish {}{}\n",
            i + 1,
            item.kind,
            item.title,
            item.publish.format(DATE_FMT),
            due
        ));
    }
    s
}

fn render_summary(summary: &RunSummary) -> String {
    let mut s = String::new();
    for r in &summary.items {
        let status = match &r.outcome {
            ItemOutcome::Submitted { id } => format!("scheduled ({id})"),
            ItemOutcome::GatewayFailed { error } => format!("FAILED: {error}"),
        };
        s.push_str(&format!(
            "- [{}] {} | publish {} | files {} | {}\n",
            r.kind,
            r.title,
            r.publish.format(DATE_FMT),
            r.attached_files,
            status
        ));
    }
    s.push_str(&format!(
        "\n{} scheduled, {} failed\n",
        summary.submitted(),
        summary.failed()
    ));
    s
}
