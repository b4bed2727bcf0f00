use data_loader::{RatingStore, extract_ratings, parser};
use std::time::Instant;

fn main() {
    let messages: Vec<String> = (0..200_000)
        .map(|i| {
            let user = i % 5_000;
            let movie = i % 1_700;
            if i % 4 == 0 {
                format!("2024-01-01T00:00:00,{},GET /rate/movie+{}={}", user, movie, (i % 5) + 1)
            } else {
                format!("2024-01-01T00:00:00,{},GET /data/m/movie+{}/{}.mpg", user, movie, i % 90)
            }
        })
        .collect();

    println!("Parsing {} synthetic activity messages...\n", messages.len());

    let start = Instant::now();
    let (records, stats) = parser::parse_batch(messages.iter().map(|m| m.as_bytes()));
    let events = extract_ratings(&records);
    let matrix = RatingStore::from_events(&events).to_matrix();
    let elapsed = start.elapsed();

    let (users, movies) = matrix.shape();

    println!("=== Parse Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Records: {} ({} dropped)", stats.accepted, stats.dropped());
    println!("Rating events: {}", events.len());
    println!("Matrix: {} users x {} movies, {} ratings", users, movies, matrix.nnz());
    println!(
        "\nPerformance: {:.0} messages/second",
        messages.len() as f64 / elapsed.as_secs_f64()
    );
}
