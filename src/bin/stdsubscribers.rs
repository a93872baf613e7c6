use mrjobs::cli::{self, JobKind};

#[tokio::main]
async fn main() {
    std::process::exit(cli::run(JobKind::StdSubscribers).await);
}
