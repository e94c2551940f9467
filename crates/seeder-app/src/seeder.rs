use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{info, warn};

use coordinates::CoordinateTable;
use sensor_client::{ClientError, CreatedSensor, SensorApi};
use types::SensorCreateRequest;

use crate::confirm::Confirm;
use crate::districts::load_plan;

const RULE_WIDTH: usize = 60;
const SUBRULE_WIDTH: usize = 40;

/// Tally of one seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub existing: usize,
    /// The pre-flight listing failed and `existing` was assumed to be zero.
    pub preflight_failed: bool,
    pub aborted: bool,
    pub attempted: u64,
    pub created: u64,
    pub failed: u64,
    /// Payloads built but not sent because of `--dry-run`.
    pub planned: u64,
}

/// Result of a single sensor submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    Created(CreatedSensor),
    Planned,
    Failed(ClientError),
}

pub struct Seeder<'a, A, C, R, W> {
    api: &'a A,
    table: &'a CoordinateTable,
    confirm: C,
    rng: R,
    out: W,
    dry_run: bool,
}

impl<'a, A, C, R, W> Seeder<'a, A, C, R, W>
where
    A: SensorApi,
    C: Confirm,
    R: Rng,
    W: Write,
{
    pub fn new(api: &'a A, table: &'a CoordinateTable, confirm: C, rng: R, out: W) -> Self {
        Self {
            api,
            table,
            confirm,
            rng,
            out,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Pre-flight, optional confirmation, plan load, submissions, summary.
    pub async fn run(&mut self, districts_path: &Path) -> Result<SeedReport> {
        let mut report = SeedReport::default();
        self.print_banner()?;

        let (existing, preflight_failed) = self.preflight().await?;
        report.existing = existing;
        report.preflight_failed = preflight_failed;

        if existing > 0 {
            writeln!(self.out, "⚠️  Found {existing} existing sensors")?;
            let proceed = match self.confirm.confirm("Do you want to add more sensors?") {
                Ok(proceed) => proceed,
                Err(err) => {
                    warn!(error = %err, "reading operator answer failed, treating as no");
                    false
                }
            };
            if !proceed {
                info!(existing, "operator declined to add sensors");
                writeln!(self.out, "👋 Exiting...")?;
                report.aborted = true;
                return Ok(report);
            }
        }

        let plan = load_plan(districts_path)
            .with_context(|| format!("load district plan {}", districts_path.display()))?;

        writeln!(self.out, "\n🔧 Creating sensors...")?;
        writeln!(self.out, "{}", "-".repeat(SUBRULE_WIDTH))?;

        for district in &plan.districts {
            writeln!(
                self.out,
                "\n📍 {} ({} sensors)",
                district.name, district.sensors_count
            )?;

            for index in 0..district.sensors_count as usize {
                let energy_source = plan
                    .energy_source_for(index)
                    .context("district plan has no energy sources")?;
                report.attempted += 1;
                match self.submit(&district.name, energy_source).await? {
                    SubmitOutcome::Created(_) => report.created += 1,
                    SubmitOutcome::Planned => report.planned += 1,
                    SubmitOutcome::Failed(_) => report.failed += 1,
                }
            }
        }

        self.print_summary(&report)?;
        info!(
            attempted = report.attempted,
            created = report.created,
            failed = report.failed,
            planned = report.planned,
            "seeding complete"
        );
        Ok(report)
    }

    /// Existing sensor count; a failed listing is reported and treated as zero.
    async fn preflight(&mut self) -> Result<(usize, bool)> {
        match self.api.count_sensors().await {
            Ok(count) => Ok((count, false)),
            Err(err) => {
                warn!(error = %err, "pre-flight sensor listing failed");
                writeln!(
                    self.out,
                    "⚠️  Could not check existing sensors ({err}); continuing as if none exist"
                )?;
                Ok((0, true))
            }
        }
    }

    /// Builds one payload for `district_name` and sends it, printing the outcome.
    pub async fn submit(&mut self, district_name: &str, energy_source: &str) -> Result<SubmitOutcome> {
        let point = self.table.generate(district_name, &mut self.rng);
        let request = SensorCreateRequest::new(district_name, point, energy_source);

        if self.dry_run {
            writeln!(
                self.out,
                "  📝 Planned: {district_name} ({energy_source}) at {:.6}, {:.6}",
                request.latitude, request.longitude
            )?;
            return Ok(SubmitOutcome::Planned);
        }

        let outcome = match self.api.create_sensor(&request).await {
            Ok(created) => {
                writeln!(
                    self.out,
                    "  ✅ Created: {district_name} ({energy_source}) - ID: {}...",
                    created.short_id()
                )?;
                SubmitOutcome::Created(created)
            }
            Err(err) => {
                match &err {
                    ClientError::Connect(_) => {
                        writeln!(self.out, "  ❌ Cannot connect to backend")?;
                    }
                    ClientError::UnexpectedStatus { status, message } => match message {
                        Some(message) => {
                            writeln!(self.out, "  ❌ Failed to create sensor: {status} ({message})")?
                        }
                        None => writeln!(self.out, "  ❌ Failed to create sensor: {status}")?,
                    },
                    other => writeln!(self.out, "  ❌ Error: {other}")?,
                }
                warn!(district = district_name, energy_source, error = %err, "sensor create failed");
                SubmitOutcome::Failed(err)
            }
        };
        Ok(outcome)
    }

    fn print_banner(&mut self) -> Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "\n{rule}")?;
        writeln!(self.out, "🌱 SENSOR SEEDER - Smart City Energy Monitoring")?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "📡 API URL: {}", self.api.base_url())?;
        if self.dry_run {
            writeln!(self.out, "📝 Dry run: payloads are printed, nothing is sent")?;
        }
        writeln!(self.out, "{rule}\n")?;
        Ok(())
    }

    fn print_summary(&mut self, report: &SeedReport) -> Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "\n{rule}")?;
        if self.dry_run {
            writeln!(self.out, "📝 Planned {} sensors (dry run)", report.planned)?;
        } else {
            writeln!(self.out, "✅ Created {} sensors successfully!", report.created)?;
            if report.failed > 0 {
                writeln!(self.out, "❌ {} sensors failed", report.failed)?;
            }
        }
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "\nYou can now start the energy simulator against this API.")?;
        Ok(())
    }
}
