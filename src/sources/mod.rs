//! The eight pages we keep tables of. Each one is a [`Source`]: where it lives, how to find the
//! table and what to fix afterwards.
//!
//! <https://www.bbc.com/sport/football/premier-league/table>
//! <https://www.worldfootball.net/competition/eng-premier-league/>

use crate::fetch::{Fetch, HttpFetcher};
use crate::generic_structs::Dataset;
use crate::table;
use crate::transform::Transform;
use log::{debug, warn};

/// The alphabetical player list for 2023/24 is spread over this many pages. Fixed for that
/// season's site layout, it is not discovered.
pub const PLAYER_LIST_PAGES: u32 = 11;

#[derive(Debug, Clone, PartialEq)]
pub enum Pages {
    Single(&'static str),
    /// `{page}` in the template is replaced by 1 up to and including `count`
    Numbered {
        template: &'static str,
        count: u32,
    },
}

impl Pages {
    pub fn urls(&self) -> Vec<String> {
        match self {
            Pages::Single(url) => vec![url.to_string()],
            Pages::Numbered { template, count } => (1..=*count)
                .map(|page| template.replace("{page}", &page.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Also the name of the table it ends up in
    pub name: &'static str,
    pub pages: Pages,
    /// Class of the table to use, otherwise the first table on the page
    pub class: Option<&'static str>,
    /// Used instead of the `<th>` labels when those are unreliable
    pub headers: Option<&'static [&'static str]>,
    pub transforms: Vec<Transform>,
}

const WORLDFOOTBALL_TABLE: Option<&str> = Some("standard_tabelle");

impl Source {
    pub fn league_table() -> Self {
        Source {
            name: "league_table",
            pages: Pages::Single("https://www.bbc.com/sport/football/premier-league/table"),
            // Class names on the BBC are generated, first table it is
            class: None,
            headers: None,
            transforms: vec![Transform::DropColumnsContaining("form")],
        }
    }

    pub fn top_scorers() -> Self {
        Source {
            name: "top_scorers",
            pages: Pages::Single("https://www.bbc.com/sport/football/premier-league/top-scorers"),
            class: None,
            headers: None,
            transforms: vec![],
        }
    }

    pub fn detail_top() -> Self {
        Source {
            name: "detail_top",
            pages: Pages::Single(
                "https://www.worldfootball.net/goalgetter/eng-premier-league-2024-2025/",
            ),
            class: WORLDFOOTBALL_TABLE,
            headers: None,
            transforms: vec![
                Transform::SplitCompound {
                    markers: &["Goals", "Penalty"],
                    leading: "Goals",
                    bracketed: "Penalty",
                },
            ],
        }
    }

    pub fn player_table() -> Self {
        Source {
            name: "player_table",
            pages: Pages::Numbered {
                template: "https://www.worldfootball.net/players_list/eng-premier-league-2023-2024/nach-name/{page}",
                count: PLAYER_LIST_PAGES,
            },
            class: WORLDFOOTBALL_TABLE,
            headers: None,
            transforms: vec![Transform::DedupColumns, Transform::DropEmptyLabels],
        }
    }

    pub fn all_time_table() -> Self {
        Source {
            name: "all_time_table",
            pages: Pages::Single(
                "https://www.worldfootball.net/alltime_table/eng-premier-league/pl-only/",
            ),
            class: WORLDFOOTBALL_TABLE,
            // Some rows come without th text
            headers: Some(&[
                "pos", "#", "Team", "Matches", "Wins", "Draws", "Losses", "Goals", "Dif", "Points",
            ]),
            transforms: vec![],
        }
    }

    pub fn all_time_winner_club() -> Self {
        Source {
            name: "all_time_winner_club",
            pages: Pages::Single("https://www.worldfootball.net/winner/eng-premier-league/"),
            class: WORLDFOOTBALL_TABLE,
            headers: None,
            transforms: vec![Transform::NormalizeColumn("Year")],
        }
    }

    pub fn top_scorers_seasons() -> Self {
        Source {
            name: "top_scorers_seasons",
            pages: Pages::Single("https://www.worldfootball.net/top_scorer/eng-premier-league/"),
            class: WORLDFOOTBALL_TABLE,
            // The page has two "#" placeholder columns; a season is only printed on the
            // first row of its group
            headers: Some(&["Season", "#", "Top scorer", "#", "Team", "Goals"]),
            transforms: vec![Transform::ForwardFill("Season")],
        }
    }

    pub fn goals_per_season() -> Self {
        Source {
            name: "goals_per_season",
            pages: Pages::Single("https://www.worldfootball.net/stats/eng-premier-league/1/"),
            class: WORLDFOOTBALL_TABLE,
            headers: None,
            transforms: vec![
                Transform::DropTotalRow,
                Transform::CanonicalGoalLabels,
            ],
        }
    }
}

/// Every source, in the order they get processed
pub fn all() -> Vec<Source> {
    vec![
        Source::league_table(),
        Source::top_scorers(),
        Source::detail_top(),
        Source::player_table(),
        Source::all_time_table(),
        Source::all_time_winner_club(),
        Source::top_scorers_seasons(),
        Source::goals_per_season(),
    ]
}

/// Fetches every page of `source`, one after the other, and builds its dataset.
///
/// Pages that fail or hold no table are skipped. With nothing left the dataset is empty, never
/// an error.
pub async fn collect<F>(fetcher: &F, source: &Source) -> Dataset
where
    F: Fetch + ?Sized,
{
    let mut parts = vec![];
    for url in source.pages.urls() {
        let document = match fetcher.fetch(&url).await {
            Some(document) => document,
            None => continue,
        };
        match table::extract(&document, source.name, source.class, source.headers) {
            Some(part) if !part.is_empty() => parts.push(part),
            Some(_) => debug!("{}: table at {} has no rows", source.name, url),
            None => warn!(
                "{}: could not find a table at {} (structure may have changed)",
                source.name, url
            ),
        }
    }
    if parts.is_empty() {
        warn!("{}: no data parsed", source.name);
        return Dataset::empty(source.name);
    }

    let mut dataset = Dataset::concat(source.name, parts);
    for transform in &source.transforms {
        transform.apply(&mut dataset);
    }
    if dataset.is_empty() {
        warn!("{}: nothing left after cleanup", source.name);
        return Dataset::empty(source.name);
    }
    debug!("{}", dataset.head(5));
    dataset
}

/// Same as [`collect`] with a fresh HTTP client
async fn collect_from_web(source: Source) -> Dataset {
    match HttpFetcher::new() {
        Ok(fetcher) => collect(&fetcher, &source).await,
        Err(e) => {
            warn!("{}: could not create HTTP client: {}", source.name, e);
            Dataset::empty(source.name)
        }
    }
}

/// Premier League standings from the BBC, without the form column
pub async fn league_table() -> Dataset {
    collect_from_web(Source::league_table()).await
}

/// Current top scorers from the BBC
pub async fn top_scorers() -> Dataset {
    collect_from_web(Source::top_scorers()).await
}

/// Top scorers of 2024/25 with goals and penalties split up
pub async fn detail_top() -> Dataset {
    collect_from_web(Source::detail_top()).await
}

/// All players of 2023/24, every page of the list
pub async fn player_table() -> Dataset {
    collect_from_web(Source::player_table()).await
}

pub async fn all_time_table() -> Dataset {
    collect_from_web(Source::all_time_table()).await
}

pub async fn all_time_winner_club() -> Dataset {
    collect_from_web(Source::all_time_winner_club()).await
}

pub async fn top_scorers_seasons() -> Dataset {
    collect_from_web(Source::top_scorers_seasons()).await
}

pub async fn goals_per_season() -> Dataset {
    collect_from_web(Source::goals_per_season()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic_structs::Cell;
    use crate::testing::FixtureFetcher;

    fn some(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    fn single_url(source: &Source) -> String {
        source.pages.urls().remove(0)
    }

    #[test]
    fn names_are_unique_and_ordered() {
        let names: Vec<&str> = all().iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "league_table",
                "top_scorers",
                "detail_top",
                "player_table",
                "all_time_table",
                "all_time_winner_club",
                "top_scorers_seasons",
                "goals_per_season",
            ]
        );
    }

    #[test]
    fn player_list_urls() {
        let urls = Source::player_table().pages.urls();
        assert_eq!(urls.len(), 11);
        assert_eq!(
            urls[0],
            "https://www.worldfootball.net/players_list/eng-premier-league-2023-2024/nach-name/1"
        );
        assert!(urls[10].ends_with("/nach-name/11"));
    }

    #[tokio::test]
    async fn league_table_drops_form() {
        let source = Source::league_table();
        let fetcher = FixtureFetcher::new()
            .with_page(&single_url(&source), include_str!("../table/standings.html"));
        let dataset = collect(&fetcher, &source).await;
        assert_eq!(dataset.name, "league_table");
        assert_eq!(dataset.headers, vec!["Pos", "Team", "Pl", "W", "D", "L", "Pts"]);
        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(dataset.rows[0], some(&["1", "Arsenal", "38", "28", "5", "5", "89"]));
    }

    #[tokio::test]
    async fn detail_top_splits_goals() {
        let source = Source::detail_top();
        let fetcher = FixtureFetcher::new()
            .with_page(&single_url(&source), include_str!("../table/goalgetter.html"));
        let dataset = collect(&fetcher, &source).await;
        assert_eq!(dataset.headers, vec!["Player", "Team", "Goals", "Penalty"]);
        assert_eq!(
            dataset.rows[0],
            some(&["Erling Haaland", "Manchester City", "18", "3"])
        );
        assert_eq!(
            dataset.rows[1],
            vec![
                Some("Mohamed Salah".to_string()),
                Some("Liverpool FC".to_string()),
                Some("9".to_string()),
                None
            ]
        );
    }

    #[tokio::test]
    async fn top_scorers_seasons_fills_season() {
        let source = Source::top_scorers_seasons();
        let fetcher = FixtureFetcher::new()
            .with_page(&single_url(&source), include_str!("top_scorer.html"));
        let dataset = collect(&fetcher, &source).await;
        assert_eq!(dataset.headers, vec!["Season", "Top scorer", "Team", "Goals"]);
        let seasons: Vec<&str> = dataset
            .column("Season")
            .unwrap()
            .into_iter()
            .map(|cell| cell.as_deref().unwrap())
            .collect();
        assert_eq!(seasons, vec!["2023/2024", "2022/2023", "2021/2022", "2021/2022"]);
        assert_eq!(
            dataset.rows[3],
            some(&["2021/2022", "Son Heung-min", "Tottenham Hotspur", "23"])
        );
    }

    #[tokio::test]
    async fn goals_per_season_cleanup() {
        let source = Source::goals_per_season();
        let fetcher = FixtureFetcher::new()
            .with_page(&single_url(&source), include_str!("goals_per_season.html"));
        let dataset = collect(&fetcher, &source).await;
        assert_eq!(
            dataset.headers,
            vec!["Season", "Matches", "Goals", "Average Goals"]
        );
        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(dataset.rows[1], some(&["2022/2023", "380", "1084", "2.85"]));
    }

    #[tokio::test]
    async fn all_time_table_uses_own_headers() {
        let source = Source::all_time_table();
        let html = "<table class=\"standard_tabelle\">\
            <tr><th>#</th><th></th><th>Team</th><th>M.</th><th>W</th><th>D</th><th>L</th>\
            <th>goals</th><th>Dif.</th><th>Pt.</th></tr>\
            <tr><td>1</td><td><img src=\"/flags/eng.png\"></td><td>Manchester United</td>\
            <td>1234</td><td>744</td><td>276</td><td>214</td><td>2328:1124</td><td>1204</td>\
            <td>2508</td></tr></table>";
        let fetcher = FixtureFetcher::new().with_page(&single_url(&source), html);
        let dataset = collect(&fetcher, &source).await;
        assert_eq!(
            dataset.headers,
            vec!["pos", "Team", "Matches", "Wins", "Draws", "Losses", "Goals", "Dif", "Points"]
        );
        assert_eq!(dataset.rows[0][1], Some("Manchester United".to_string()));
        assert_eq!(dataset.rows[0][6], Some("2328:1124".to_string()));
    }

    #[tokio::test]
    async fn winner_years_normalized() {
        let source = Source::all_time_winner_club();
        let html = "<table class=\"standard_tabelle\">\
            <tr><th>Year</th><th>Winner</th></tr>\
            <tr><td><a href=\"/2023\">2023\n2024</a></td><td>Manchester City</td></tr></table>";
        let fetcher = FixtureFetcher::new().with_page(&single_url(&source), html);
        let dataset = collect(&fetcher, &source).await;
        assert_eq!(dataset.headers, vec!["Year", "Winner"]);
        assert_eq!(dataset.rows[0], some(&["2023 2024", "Manchester City"]));
    }

    #[tokio::test]
    async fn player_pages_concatenated() {
        let _ = env_logger::builder().is_test(true).try_init();
        let source = Source::player_table();
        let urls = source.pages.urls();
        let fetcher = FixtureFetcher::new()
            .with_page(
                &urls[0],
                "<table class=\"standard_tabelle\">\
                 <tr><th>Player</th><th></th><th>Team</th><th>born</th><th>Position</th></tr>\
                 <tr><td>Tyler Adams</td><td></td><td>Bournemouth</td><td>14/02/1999</td><td>Midfielder</td></tr>\
                 <tr><td>Tosin Adarabioyo</td><td></td><td>Fulham</td><td>24/09/1997</td><td>Defender</td></tr>\
                 </table>",
            )
            // No table on this one
            .with_page(&urls[1], "<html><body><p>Maintenance</p></body></html>")
            .with_page(
                &urls[2],
                "<table class=\"standard_tabelle\">\
                 <tr><th>Player</th><th></th><th>Team</th><th>born</th><th>Position</th></tr>\
                 <tr><td>Jarrod Bowen</td><td></td><td>West Ham United</td><td>20/12/1996</td><td>Forward</td></tr>\
                 </table>",
            );
        let dataset = collect(&fetcher, &source).await;
        assert_eq!(dataset.name, "player_table");
        assert_eq!(dataset.headers, vec!["Player", "Team", "born", "Position"]);
        let players: Vec<&str> = dataset
            .column("Player")
            .unwrap()
            .into_iter()
            .map(|cell| cell.as_deref().unwrap())
            .collect();
        assert_eq!(players, vec!["Tyler Adams", "Tosin Adarabioyo", "Jarrod Bowen"]);
        assert_eq!(fetcher.requested().len(), 11);
    }

    #[tokio::test]
    async fn nothing_found_is_empty() {
        let _ = env_logger::builder().is_test(true).try_init();
        let source = Source::detail_top();
        // Page is there, but without the worldfootball table
        let fetcher = FixtureFetcher::new()
            .with_page(&single_url(&source), include_str!("../table/standings.html"));
        let dataset = collect(&fetcher, &source).await;
        assert!(dataset.is_empty());
        assert!(dataset.headers.is_empty());

        // Page could not be fetched at all
        let dataset = collect(&FixtureFetcher::new(), &Source::league_table()).await;
        assert_eq!(dataset, Dataset::empty("league_table"));
    }

    #[tokio::test]
    async fn placeholder_columns_only_is_empty() {
        let _ = env_logger::builder().is_test(true).try_init();
        let source = Source::top_scorers();
        let fetcher = FixtureFetcher::new().with_page(
            &single_url(&source),
            "<table><tr><th>#</th></tr><tr><td>1</td></tr><tr><td>2</td></tr></table>",
        );
        let dataset = collect(&fetcher, &source).await;
        assert_eq!(dataset, Dataset::empty("top_scorers"));

        // Every column removed by a transform
        let source = Source::league_table();
        let fetcher = FixtureFetcher::new().with_page(
            &single_url(&source),
            "<table><tr><th>Form</th></tr><tr><td>WWDLW</td></tr></table>",
        );
        let dataset = collect(&fetcher, &source).await;
        assert_eq!(dataset, Dataset::empty("league_table"));
    }

    #[tokio::test]
    async fn collecting_twice_is_identical() {
        let source = Source::top_scorers_seasons();
        let fetcher = FixtureFetcher::new()
            .with_page(&single_url(&source), include_str!("top_scorer.html"));
        let first = collect(&fetcher, &source).await;
        let second = collect(&fetcher, &source).await;
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
