//! Binary entry point that glues the SQLite-backed circulation core to a
//! plain command-line surface. All the logic lives in the library; this file
//! only parses arguments, formats results, and owns the confirmation rule
//! for the destructive reset.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};

use library_loan_manager::{
    bootstrap_catalog, circulation, db, open_store, reset_all, BorrowerType, Loan, LoanDraft,
    BUNDLED_SEED,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    let mut conn = open_store()?;
    bootstrap_catalog(&mut conn, BUNDLED_SEED)?;

    match command.as_str() {
        "list" => {
            let today = Local::now().date_naive();
            for loan in db::list_all_loans(&conn)? {
                print_loan(&loan, today);
            }
        }
        "borrow" => {
            let draft = parse_borrow_args(&args[1..])?;
            let loan = circulation::borrow(&mut conn, &draft)?;
            println!(
                "loan {} registered: \"{}\" to {} until {}",
                loan.id, loan.title, loan.borrower_name, loan.due_date
            );
        }
        "return" => {
            let loan = circulation::return_loan(&conn, parse_id(&args[1..])?)?;
            println!("loan {} returned: \"{}\"", loan.id, loan.title);
        }
        "remove" => {
            let id = parse_id(&args[1..])?;
            circulation::remove_loan(&conn, id)?;
            println!("loan {id} removed");
        }
        "search" => {
            let query = args
                .get(1)
                .ok_or_else(|| anyhow!("usage: search <title>"))?;
            let summary = circulation::summarize_search(&conn, query)?;
            println!(
                "{} found, {} available, {} on loan",
                summary.total, summary.available, summary.loaned_out
            );
            for m in &summary.matches {
                match &m.borrower_name {
                    Some(name) => println!("  [{}] {} - on loan to {name}", m.book.accession_id, m.book.title),
                    None => println!("  [{}] {} - available", m.book.accession_id, m.book.title),
                }
            }
        }
        "book" => {
            let id = args
                .get(1)
                .ok_or_else(|| anyhow!("usage: book <accession-number>"))?;
            let book = db::get_book(&conn, id)?;
            println!("[{}] {book}", book.accession_id);
        }
        "reset" => {
            // The confirmation prompt is the caller's job, so destruction
            // requires an explicit flag instead of an interactive question.
            if args.get(1).map(String::as_str) != Some("--yes") {
                bail!("reset wipes every book and loan; pass --yes to confirm");
            }
            reset_all(&mut conn)?;
            println!("store wiped; the catalog will re-bootstrap on next run");
        }
        other => {
            print_usage();
            bail!("unknown command: {other}");
        }
    }

    Ok(())
}

/// `borrow <accession> <quantity> <student|teacher> <name> <due-date> [grade] [classroom]`
fn parse_borrow_args(args: &[String]) -> Result<LoanDraft> {
    const USAGE: &str =
        "usage: borrow <accession> <quantity> <student|teacher> <name> <due-date> [grade] [classroom]";

    let [accession_id, quantity, borrower_type, name, due_date, rest @ ..] = args else {
        bail!(USAGE);
    };

    let borrower_type = BorrowerType::parse(borrower_type)
        .ok_or_else(|| anyhow!("borrower must be \"student\" or \"teacher\""))?;
    let quantity: u32 = quantity
        .parse()
        .with_context(|| format!("invalid quantity {quantity:?}"))?;
    let due_date = NaiveDate::parse_from_str(due_date, "%Y-%m-%d")
        .with_context(|| format!("invalid due date {due_date:?}, expected YYYY-MM-DD"))?;

    Ok(LoanDraft {
        accession_id: accession_id.clone(),
        quantity,
        borrower_type,
        borrower_name: name.clone(),
        grade: rest.first().cloned(),
        classroom: rest.get(1).cloned(),
        due_date,
    })
}

fn parse_id(args: &[String]) -> Result<i64> {
    let raw = args.first().ok_or_else(|| anyhow!("missing loan id"))?;
    raw.parse()
        .with_context(|| format!("invalid loan id {raw:?}"))
}

fn print_loan(loan: &Loan, today: NaiveDate) {
    let status = circulation::status_of(loan, today);
    let who = match &loan.grade {
        Some(grade) => format!("{} (grade {grade})", loan.borrower_name),
        None => loan.borrower_name.clone(),
    };
    println!(
        "{:>4}  {:<9}  [{}] \"{}\" x{}  {who}  {} -> {}",
        loan.id, status, loan.accession_id, loan.title, loan.quantity, loan.loan_date, loan.due_date
    );
}

fn print_usage() {
    println!("library-loan-manager <command>");
    println!("  list                                          show every loan");
    println!("  borrow <accession> <qty> <who> <name> <due> [grade] [classroom]");
    println!("  return <loan-id>                              mark a loan returned");
    println!("  remove <loan-id>                              erase a loan record");
    println!("  search <title>                                availability summary by title");
    println!("  book <accession>                              show one catalog entry");
    println!("  reset --yes                                   wipe the store");
}
