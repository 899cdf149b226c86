use crate::infra::{local_admin, InMemoryDirectory, InMemorySessions};
use chrono::Utc;
use clap::Args;
use schoolhub::directory::admin::AdminService;
use schoolhub::directory::{
    Board, DirectoryService, ListingOutcome, ListingState, SchoolFields, SchoolImporter,
    SchoolRecord, SchoolType, SortKey,
};
use schoolhub::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

const SAMPLE_SCHOOLS: &str = include_str!("../../../crates/schoolhub/fixtures/odisha_schools.csv");
const DEMO_TOKEN: &str = "demo-admin";

#[derive(Args, Debug)]
pub(crate) struct ListingArgs {
    /// School CSV export to browse
    #[arg(long)]
    pub(crate) schools_csv: PathBuf,
    /// Case-insensitive search over school name and city
    #[arg(long)]
    pub(crate) query: Option<String>,
    /// Only show schools in this city
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Only show schools affiliated to this board
    #[arg(long)]
    pub(crate) board: Option<String>,
    /// Sort order: rating, name, city or established
    #[arg(long, default_value = "rating")]
    pub(crate) sort: SortKey,
    /// Page to show (clamped to the last page)
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the admin back office portion of the demo.
    #[arg(long)]
    pub(crate) skip_admin: bool,
}

pub(crate) fn run_listing(args: ListingArgs) -> Result<(), AppError> {
    let schools = SchoolImporter::from_path(&args.schools_csv)?;
    let service = DirectoryService::new(Arc::new(InMemoryDirectory::seeded(schools)));
    let state = listing_state(&args);

    render_listing(&service.listing(&state), &state);
    Ok(())
}

fn listing_state(args: &ListingArgs) -> ListingState {
    let mut state = ListingState::default();
    if let Some(query) = &args.query {
        state.set_search_query(query.as_str());
    }
    if let Some(city) = &args.city {
        state.select_city(city.as_str());
    }
    if let Some(board) = &args.board {
        state.select_board(board.as_str());
    }
    state.set_sort_key(args.sort);
    state.go_to_page(args.page);
    state
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let schools = SchoolImporter::from_reader(SAMPLE_SCHOOLS.as_bytes())?;
    let (user, profile) = local_admin(Utc::now());
    let backend = Arc::new(InMemoryDirectory::seeded(schools).with_profile(profile));
    let directory = DirectoryService::new(backend.clone());

    println!("School directory demo");
    let mut state = ListingState::default();
    let outcome = directory.listing(&state);
    render_listing(&outcome, &state);

    state.next_page(outcome.page.total_pages);
    println!();
    render_listing(&directory.listing(&state), &state);

    state.select_city("Cuttack");
    state.set_sort_key(SortKey::Established);
    println!("\nFiltered to Cuttack, newest first");
    render_listing(&directory.listing(&state), &state);

    let boards = directory
        .boards()?
        .iter()
        .map(|board| board.label())
        .collect::<Vec<_>>()
        .join(", ");
    println!("Boards on offer: {boards}");

    if args.skip_admin {
        return Ok(());
    }

    println!("\nAdmin back office demo");
    let sessions = Arc::new(InMemorySessions::default().with_admin(DEMO_TOKEN, user));
    let admin = AdminService::new(backend, sessions);

    if let Err(err) = admin.authorize(None) {
        println!("- Anonymous request refused: {err}");
    }
    let session = match admin.authorize(Some(DEMO_TOKEN)) {
        Ok(session) => session,
        Err(err) => {
            println!("- Admin session rejected: {err}");
            return Ok(());
        }
    };
    println!("- Signed in as {}", session.email);

    let incomplete = SchoolFields {
        name: "Unnamed".to_string(),
        ..SchoolFields::default()
    };
    if let Err(err) = admin.create_school(incomplete) {
        println!("- Incomplete form refused: {err}");
    }

    let created = match admin.create_school(demo_school_fields()) {
        Ok(created) => created,
        Err(err) => {
            println!("- Create failed: {err}");
            return Ok(());
        }
    };
    println!("- Created {} ({})", created.name, created.id);

    match admin.dashboard() {
        Ok(stats) => println!(
            "- Dashboard: {} schools | {} users | average rating {:.1}",
            stats.total_schools, stats.total_users, stats.average_rating
        ),
        Err(err) => println!("- Dashboard unavailable: {err}"),
    }

    match admin.analytics() {
        Ok(report) => {
            println!("- Schools by board:");
            for entry in &report.schools_by_board {
                println!("    {}: {}", entry.board, entry.count);
            }
        }
        Err(err) => println!("- Analytics unavailable: {err}"),
    }

    match admin.delete_school(&created.id) {
        Ok(()) => println!("- Deleted {}", created.id),
        Err(err) => println!("- Delete failed: {err}"),
    }

    Ok(())
}

fn demo_school_fields() -> SchoolFields {
    SchoolFields {
        name: "Capital High School".to_string(),
        city: "Bhubaneswar".to_string(),
        district: "Khordha".to_string(),
        school_type: Some(SchoolType::Government),
        board: Some(Board::StateBoard),
        established: Some(1962),
        facilities: vec!["Library".to_string(), "Playground".to_string()],
        ..SchoolFields::default()
    }
}

fn render_listing(outcome: &ListingOutcome, state: &ListingState) {
    if let Some(notice) = outcome.notice {
        println!("{notice}");
    }

    let page = &outcome.page;
    println!(
        "{} (page {} of {}, {})",
        page.summary(),
        page.current_page,
        page.total_pages,
        state.sort_key.label()
    );
    if page.records.is_empty() {
        println!("  No schools found");
        return;
    }
    for (offset, record) in page.records.iter().enumerate() {
        println!("  {:>2}. {}", page.range_start + offset, describe(record));
    }
}

fn describe(record: &SchoolRecord) -> String {
    let established = record
        .established
        .map(|year| format!("est. {year}"))
        .unwrap_or_else(|| "est. n/a".to_string());
    let rating = match record.ratings {
        Some(ratings) => format!("{:.1}", ratings.overall),
        None => "unrated".to_string(),
    };
    format!(
        "{} | {}, {} | {} | {} | {} | {}",
        record.name,
        record.city,
        record.district,
        record.board,
        record.school_type,
        established,
        rating
    )
}
