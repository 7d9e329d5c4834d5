use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use iprd_content::access::{guard, Access, Role, Route};
use iprd_content::config::{default_data_dir, Settings};
use iprd_content::debounce::SearchDebouncer;
use iprd_content::export::{print_preview, to_csv, to_json};
use iprd_content::filter::{unique_departments, FilterSpec, Page};
use iprd_content::reports::{count_by_content_type, count_by_department, count_by_month, Count, DateRange};
use iprd_content::share::ShareForm;
use iprd_content::upload::{inspect_file, UploadRequest};
use iprd_content::workflow::{final_videos, raw_videos};
use iprd_content::{parse_day, ContentManager, ContentRecord, ContentType, Source, Tag, TAG_TYPES};

#[derive(Debug, Parser)]
#[command(name = "iprd")]
#[command(about = "District media library: search, tag, clip and share content", long_about = None)]
pub struct Cli {
    /// Where the library keeps its tables
    #[arg(long, env = "IPRD_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Signed-in user; commands other than `help` need one
    #[arg(short, long, env = "IPRD_USER", global = true)]
    user: Option<String>,

    #[arg(long, env = "IPRD_ROLE", default_value = "Guest", global = true)]
    role: Role,

    /// Read cache entries, 0 to disable
    #[arg(long, env = "IPRD_CACHE_SIZE", default_value_t = 100, global = true)]
    cache_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Format {
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Debug, clap::Args)]
struct SearchArgs {
    /// Free text matched against name, department, person and tags
    text: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    district: Option<String>,
    #[arg(long)]
    block: Option<String>,
    #[arg(long = "type")]
    content_type: Option<ContentType>,
    #[arg(long)]
    person: Option<String>,
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    year_from: Option<i32>,
    #[arg(long)]
    year_to: Option<i32>,
    /// Department chip; repeat to allow several
    #[arg(long = "chip")]
    chips: Vec<String>,
}

impl SearchArgs {
    fn into_spec(self) -> FilterSpec {
        FilterSpec {
            search_text: self.text,
            department: self.department,
            district: self.district,
            block: self.block,
            content_type: self.content_type,
            person_tag: self.person,
            tag_type: self.tag,
            year_start: self.year_from,
            year_end: self.year_to,
            departments: self.chips,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every record, one page at a time
    List {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },

    /// Search with filters
    Search {
        #[command(flatten)]
        filters: SearchArgs,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
        /// Start from a saved preset
        #[arg(long)]
        preset: Option<String>,
        /// Save these filters under a name
        #[arg(long)]
        save_as: Option<String>,
        /// Read search text from stdin, one line per keystroke burst
        #[arg(long, conflicts_with = "save_as")]
        interactive: bool,
    },

    /// Show one record and count the view
    Show { id: i64 },

    /// Write a printable HTML page for one record
    Print {
        id: i64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add a file to the library
    Upload {
        file: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        department: String,
        /// Detected from the file when omitted
        #[arg(long = "type")]
        content_type: Option<ContentType>,
        #[arg(long, default_value = "")]
        district: String,
        #[arg(long, default_value = "")]
        block: String,
        #[arg(long, default_value = "")]
        person: String,
        #[arg(long, default_value = "cloud")]
        source: Source,
        #[arg(long, default_value = "")]
        remarks: String,
    },

    /// Tag a raw video and mark it final
    Tag {
        id: i64,
        /// START,END,TYPE[,REMARKS] with times as HH:MM:SS
        #[arg(long = "add", required = true)]
        tags: Vec<String>,
    },

    /// Queue the clip covered by one tag of a final video for sharing
    Clip {
        id: i64,
        /// Zero-based tag position
        tag: usize,
    },

    /// Share content with a person; a queued clip is attached
    Share {
        #[arg(long)]
        department: String,
        #[arg(long)]
        person: String,
        /// File name or ID; filled from the queued clip when omitted
        #[arg(long, default_value = "")]
        file: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        mobile: String,
        #[arg(long, default_value = "")]
        remarks: String,
    },

    /// List shares
    Shares,

    /// Delete stored records
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Add an untimed tag to several records
    BulkTag {
        #[arg(long = "tag")]
        tag_type: String,
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Raw and final videos
    Videos {
        #[arg(long, conflicts_with = "finals")]
        raw: bool,
        #[arg(long = "final")]
        finals: bool,
    },

    /// Recent audit entries, newest first
    Audit {
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },

    /// Counts by department, type and month, or an export
    Report {
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },

    /// Totals, top tags and recent uploads
    Dashboard,

    /// Saved search presets
    Presets {
        #[arg(long)]
        delete: Option<String>,
    },

    /// Space used against the nominal quota
    Usage,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_day(value).ok_or_else(|| format!("expected YYYY-MM-DD, got '{}'", value))
}

impl Commands {
    fn route(&self) -> Route {
        match self {
            Commands::List { .. }
            | Commands::Search { .. }
            | Commands::Show { .. }
            | Commands::Print { .. }
            | Commands::Delete { .. }
            | Commands::BulkTag { .. }
            | Commands::Presets { .. } => Route::Search,
            Commands::Upload { .. } => Route::AddContent,
            Commands::Tag { .. } | Commands::Clip { .. } | Commands::Videos { .. } => Route::VideoLibrary,
            Commands::Share { .. } | Commands::Shares => Route::Share,
            Commands::Audit { .. } => Route::AuditLogs,
            Commands::Report { .. } => Route::Reports,
            Commands::Dashboard | Commands::Usage => Route::Dashboard,
        }
    }
}

fn parse_tag(spec: &str) -> anyhow::Result<Tag> {
    let parts: Vec<&str> = spec.splitn(4, ',').map(str::trim).collect();
    let [start, end, tag_type, rest @ ..] = parts.as_slice() else {
        bail!("tag '{}' should look like START,END,TYPE[,REMARKS]", spec);
    };
    let tag = Tag::new(*start, *end, *tag_type);
    Ok(match rest.first() {
        Some(remarks) if !remarks.is_empty() => tag.with_remarks(*remarks),
        _ => tag,
    })
}

fn print_rows(records: &[ContentRecord]) {
    for r in records {
        let content_type = r.content_type.map(|t| t.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{:>14}  {:<8}  {:<5}  {:<18}  {}",
            r.id,
            content_type,
            r.status().to_string(),
            r.department,
            r.name
        );
    }
}

fn print_page(page: &Page<ContentRecord>, format: Format) -> anyhow::Result<()> {
    match format {
        Format::Table => {
            print_rows(&page.items);
            println!(
                "page {} of {} ({} results)",
                page.page,
                page.total_pages.max(1),
                page.total
            );
            let departments = unique_departments(&page.items);
            if !departments.is_empty() {
                println!("departments: {}", departments.join(", "));
            }
        }
        Format::Csv => println!("{}", to_csv(&page.items)),
        Format::Json => println!("{}", to_json(&page.items)?),
    }
    Ok(())
}

fn print_counts(title: &str, counts: &[Count]) {
    println!("{}:", title);
    for c in counts {
        println!("  {:<24} {}", c.name, c.count);
    }
}

fn print_record(record: &ContentRecord, views: u64) {
    println!("{} (#{})", record.name, record.id);
    let content_type = record.content_type.map(|t| t.to_string()).unwrap_or_default();
    for (label, value) in [
        ("Department", record.department.as_str()),
        ("District", record.district.as_str()),
        ("Block", record.block.as_str()),
        ("Person", record.person_tag.as_str()),
        ("Type", content_type.as_str()),
        ("Uploaded", record.upload_date.as_str()),
        ("By", record.uploaded_by.as_str()),
        ("Remarks", record.remarks.as_str()),
    ] {
        if !value.is_empty() {
            println!("  {:<11} {}", label, value);
        }
    }
    println!("  {:<11} {}", "Status", record.status());
    println!("  {:<11} {}", "Source", record.source());
    if record.metadata.file_size.is_some() {
        println!("  {:<11} {}", "Size", record.metadata.formatted_size());
    }
    if let Some(duration) = record.metadata.formatted_duration() {
        println!("  {:<11} {}", "Duration", duration);
    }
    if let Some(dimensions) = record.metadata.formatted_dimensions() {
        println!("  {:<11} {}", "Dimensions", dimensions);
    }
    for entry in &record.metadata.zip_entries {
        println!("  {:<11} {} ({} bytes)", "Contains", entry.name, entry.size);
    }
    for (index, tag) in record.tags.iter().enumerate() {
        if tag.untimed {
            println!("  [{}] {}", index, tag.tag_type);
        } else {
            println!("  [{}] {} {} - {}", index, tag.tag_type, tag.start_time, tag.end_time);
        }
    }
    println!("  {:<11} {}", "Views", views);
}

async fn interactive_search(manager: &ContentManager, base: FilterSpec, format: Format) -> anyhow::Result<()> {
    let (debouncer, mut settled) = SearchDebouncer::spawn(manager.settings().debounce);
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if !debouncer.push(line) {
                break;
            }
        }
    });

    while let Some(text) = settled.recv().await {
        let spec = FilterSpec {
            search_text: Some(text.clone()),
            ..base.clone()
        };
        println!("> {}", text);
        print_page(&manager.search(&spec, 1).await?, format)?;
    }
    reader.await.context("stdin reader stopped")?;
    Ok(())
}

pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let role = cli.user.as_deref().filter(|u| !u.trim().is_empty()).map(|_| cli.role);
    let route = cli.command.route();
    if let Access::Redirect(to) = guard(role, route) {
        match role {
            None => bail!("sign in first: pass --user or set IPRD_USER"),
            Some(role) => bail!("{} cannot open {:?}; try {:?} instead", role, route, to),
        }
    }
    let user = cli.user.unwrap_or_default();

    let settings = Settings {
        data_dir: cli.data_dir.unwrap_or_else(default_data_dir),
        cache_size: cli.cache_size,
        ..Settings::default()
    };
    let manager = ContentManager::open(settings).await?;

    match cli.command {
        Commands::List { page, format } => {
            print_page(&manager.search(&FilterSpec::default(), page).await?, format)?;
        }
        Commands::Search { filters, page, format, preset, save_as, interactive } => {
            let mut spec = match preset {
                Some(name) => manager
                    .presets()
                    .get(&name)
                    .await
                    .with_context(|| format!("no preset named '{}'", name))?
                    .filters,
                None => FilterSpec::default(),
            };
            let given = filters.into_spec();
            if !given.is_empty() {
                spec = given;
            }
            if interactive {
                return interactive_search(&manager, spec, format).await;
            }
            let results = manager.search(&spec, page).await?;
            print_page(&results, format)?;
            if let Some(name) = save_as {
                manager.presets().save(&name, spec, results.total).await?;
                println!("Saved preset '{}'", name.trim());
            }
        }
        Commands::Show { id } => {
            let (record, views) = manager.show(id).await?;
            print_record(&record, views);
        }
        Commands::Print { id, output } => {
            let (record, _) = manager.show(id).await?;
            let html = print_preview(&record);
            match output {
                Some(path) => {
                    tokio::fs::write(&path, html)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", html),
            }
        }
        Commands::Upload { file, name, department, content_type, district, block, person, source, remarks } => {
            let inspected = inspect_file(&file).await?;
            let request = UploadRequest {
                name,
                department,
                content_type: content_type.or(Some(inspected.suggested_type())),
                district,
                block,
                person_tag: person,
                source,
                remarks,
                file: Some(inspected.metadata),
            };
            let record = manager.upload(request, &user).await?;
            println!(
                "Uploaded '{}' as #{} ({}, {})",
                record.name,
                record.id,
                record.content_type.map(|t| t.to_string()).unwrap_or_default(),
                record.status()
            );
        }
        Commands::Tag { id, tags } => {
            let mut editor = manager.editor(id).await?;
            editor.send_to_editing()?;
            for spec in &tags {
                let tag = parse_tag(spec)?;
                if !TAG_TYPES.contains(&tag.tag_type.as_str()) {
                    warn!(tag_type = %tag.tag_type, offered = ?TAG_TYPES, "tag type is not one of the offered categories");
                }
                editor.add_tag(tag)?;
            }
            let record = manager.commit_tags(&mut editor, &user).await?;
            println!("Tagged '{}' with {} tag(s); now {}", record.name, record.tags.len(), record.status());
        }
        Commands::Clip { id, tag } => {
            let (clip, replaced) = manager.queue_clip(id, tag).await?;
            if let Some(old) = replaced {
                println!("Replaced unshared clip {} - {} of #{}", old.clip_start, old.clip_end, old.video_id);
            }
            println!(
                "Queued clip {} - {} ({}) of '{}' for sharing",
                clip.clip_start, clip.clip_end, clip.clip_duration, clip.file_name
            );
        }
        Commands::Share { department, person, file, email, mobile, remarks } => {
            let form = ShareForm {
                department,
                person_name: person,
                file_name: file,
                email,
                mobile,
                remarks,
            };
            let share = manager.share(form, &user).await?;
            match &share.metadata.clip {
                Some(clip) => println!(
                    "Video clip ({} - {}) shared with {}",
                    clip.clip_start, clip.clip_end, share.person_name
                ),
                None => println!("Shared '{}' with {}", share.file_name, share.person_name),
            }
        }
        Commands::Shares => {
            for s in manager.shares().list().await {
                let kind = if s.is_clip() { "clip" } else { "full" };
                println!("{:<10}  {:<4}  {:<18}  {:<20}  {}", s.date, kind, s.department, s.person_name, s.file_name);
            }
        }
        Commands::Delete { ids } => {
            let removed = manager.bulk_delete(&ids, &user).await?;
            println!("Deleted {} item(s)", removed);
        }
        Commands::BulkTag { tag_type, ids } => {
            let tagged = manager.bulk_tag(&ids, &tag_type, &user).await?;
            println!("Tagged {} item(s) with \"{}\"", tagged, tag_type.trim());
        }
        Commands::Videos { raw, finals } => {
            let all = manager.store().load_all().await;
            if !finals {
                println!("Raw videos:");
                print_rows(&raw_videos(&all));
            }
            if !raw {
                println!("Final videos:");
                print_rows(&final_videos(&all));
            }
        }
        Commands::Audit { limit } => {
            for e in manager.audit().recent(limit).await {
                println!("{:<21}  {:<12}  {:<11}  {:<15}  {}", e.date, e.user, e.action.as_str(), e.ip, e.file);
            }
        }
        Commands::Report { from, to, format } => {
            let records = manager.report(DateRange { from, to }).await;
            match format {
                Format::Table => {
                    println!("Total: {}", records.len());
                    print_counts("By department", &count_by_department(&records));
                    print_counts("By type", &count_by_content_type(&records));
                    print_counts("By month", &count_by_month(&records));
                }
                Format::Csv => println!("{}", to_csv(&records)),
                Format::Json => println!("{}", to_json(&records)?),
            }
        }
        Commands::Dashboard => {
            let stats = manager.dashboard().await;
            println!("Total uploads:  {}", stats.total_uploads);
            println!("Total searches: {}", stats.total_searches);
            println!("Total shares:   {}", stats.total_shares);
            println!("Cloud / local:  {}% / {}%", stats.cloud_percent, stats.local_percent);
            print_counts("Top tags", &stats.top_tags);
            println!("Recent uploads:");
            print_rows(&stats.recent_uploads);
        }
        Commands::Presets { delete } => match delete {
            Some(name) => {
                if manager.presets().delete(&name).await? {
                    println!("Deleted preset '{}'", name);
                } else {
                    bail!("no preset named '{}'", name);
                }
            }
            None => {
                for p in manager.presets().list().await {
                    println!("{:<20}  {:>4} results  {}", p.name, p.result_count, p.created_at);
                }
            }
        },
        Commands::Usage => {
            let usage = manager.usage().await?;
            println!(
                "{} of {} bytes used ({:.1}%)",
                usage.used, usage.capacity, usage.percentage
            );
        }
    }

    Ok(())
}
