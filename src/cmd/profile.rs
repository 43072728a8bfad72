use crate::reports;
use clap::Args;
use neuroforge::config::NormalizerParams;
use neuroforge::matcher;
use neuroforge::normalizer;
use neuroforge::store::{self, SessionStore};
use strum::IntoEnumIterator;

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub norms: NormalizerParams,

    #[arg(short, long)]
    pub user: String,
}

pub fn run(args: ProfileArgs, store: &mut dyn SessionStore) {
    let records = store::fetch_history_with_retry(store, &args.user);

    if records.iter().all(|r| !r.is_completed()) {
        println!(
            "ℹ️  No completed sessions for '{}'; the profile below uses neutral priors.",
            args.user
        );
    }

    let latest = normalizer::latest_by_type(&records);
    let traits = normalizer::normalize(&latest, &args.norms);
    reports::print_trait_profile(&args.user, &traits);

    println!();
    for game in neuroforge::games::GameType::iter() {
        let record = match latest.get(&game) {
            Some(r) => r,
            None => continue,
        };
        match store.fetch_baseline(game) {
            Ok(Some(baseline)) => {
                let report = normalizer::z_score(record.avg_reaction_time_ms, &baseline);
                reports::print_z_report(&game.to_string(), report);
            }
            Ok(None) => reports::print_z_report(&game.to_string(), None),
            Err(e) => eprintln!("❌ Baseline lookup failed for {game}: {e}"),
        }
        println!(
            "   consistency (rt σ): {:.0} ms, post-error resilience: {:.2}",
            normalizer::consistency(&record.reaction_times(), &args.norms),
            normalizer::resilience(record)
        );
    }

    let matches = matcher::find_top_matches(&traits);
    reports::print_career_matches(&matches);
}
