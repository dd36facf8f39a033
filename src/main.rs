use hit::error::AppResult;

fn main() -> AppResult<()> {
    hit::run()
}
