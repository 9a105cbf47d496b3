use rgs_emulator::games::Catalogue;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1);

    let catalogue = match &path {
        Some(path) => {
            println!("Checking books file: {}", path);
            Catalogue::load(path)?
        }
        None => {
            println!("Checking bundled books");
            Catalogue::embedded()?
        }
    };

    println!(
        "{:>6}  {:>10}  {:>5}  {:>4}  {:>6}  {:>7}  criteria",
        "id", "multiplier", "bonus", "fs", "events", "reveals"
    );
    for book in catalogue.iter() {
        println!(
            "{:>6}  {:>10}  {:>5}  {:>4}  {:>6}  {:>7}  {}",
            book.id,
            book.payout_multiplier.as_f64(),
            book.is_bonus(),
            book.free_spins_awarded(),
            book.events.len(),
            book.reveal_count(),
            book.criteria
        );
        if let Some(last) = book.events.last() {
            println!("        last event: {}", last.event.kind());
        }
    }

    let paying = catalogue.iter().filter(|b| !b.payout_multiplier.is_zero()).count();
    println!(
        "✅ {} books valid ({} bonus, {} paying)",
        catalogue.len(),
        catalogue.bonus_count(),
        paying
    );

    Ok(())
}
