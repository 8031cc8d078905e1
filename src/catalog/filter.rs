use super::models::Game;

/// How many catalog entries are offered when a search finds nothing.
pub const SUGGESTION_COUNT: usize = 3;

/// What the game menu should show for the current catalog and search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogView<'a> {
    Matches(Vec<&'a Game>),
    NoResults { suggestions: &'a [Game] },
}

impl CatalogView<'_> {
    #[must_use]
    pub fn shows_suggestions(&self) -> bool {
        matches!(self, CatalogView::NoResults { .. })
    }
}

/// Games whose name contains `term`, ignoring case, in catalog order.
#[must_use]
pub fn filtered_games<'a>(catalog: &'a [Game], term: &str) -> Vec<&'a Game> {
    let needle = term.to_lowercase();
    catalog
        .iter()
        .filter(|game| game.name.to_lowercase().contains(&needle))
        .collect()
}

/// The head of the unfiltered catalog. The search term plays no part.
#[must_use]
pub fn suggestions(catalog: &[Game]) -> &[Game] {
    &catalog[..catalog.len().min(SUGGESTION_COUNT)]
}

#[must_use]
pub fn catalog_view<'a>(catalog: &'a [Game], term: &str) -> CatalogView<'a> {
    let matches = filtered_games(catalog, term);
    if matches.is_empty() {
        CatalogView::NoResults {
            suggestions: suggestions(catalog),
        }
    } else {
        CatalogView::Matches(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: i64, name: &str) -> Game {
        Game {
            id,
            name: name.to_owned(),
            description: format!("{name} description"),
            thumb: format!("https://thumbs.example/{id}.png"),
            link: format!("https://games.example/{id}"),
        }
    }

    fn five_games() -> Vec<Game> {
        vec![
            game(1, "Pac-Man"),
            game(2, "Tetris"),
            game(3, "Galaga"),
            game(4, "Ms. Pac-Man"),
            game(5, "Donkey Kong"),
        ]
    }

    fn names(games: &[&Game]) -> Vec<String> {
        games.iter().map(|g| g.name.clone()).collect()
    }

    #[test]
    fn matches_names_case_insensitively() {
        let catalog = vec![game(1, "Pac-Man")];
        assert_eq!(names(&filtered_games(&catalog, "pac")), vec!["Pac-Man"]);
        assert_eq!(names(&filtered_games(&catalog, "PAC-M")), vec!["Pac-Man"]);
    }

    #[test]
    fn keeps_catalog_order_for_matches() {
        let catalog = five_games();
        assert_eq!(
            names(&filtered_games(&catalog, "pac")),
            vec!["Pac-Man", "Ms. Pac-Man"]
        );
    }

    #[test]
    fn empty_term_matches_everything() {
        let catalog = five_games();
        let all = filtered_games(&catalog, "");
        assert_eq!(all.len(), catalog.len());
        assert!(all.iter().zip(&catalog).all(|(a, b)| *a == b));
    }

    #[test]
    fn only_names_are_searched() {
        let catalog = vec![game(1, "Galaga")];
        assert!(filtered_games(&catalog, "description").is_empty());
        assert!(filtered_games(&catalog, "games.example").is_empty());
    }

    #[test]
    fn suggestions_are_first_three_entries() {
        let catalog = five_games();
        let ids: Vec<i64> = suggestions(&catalog).iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let short = vec![game(9, "Pong")];
        assert_eq!(suggestions(&short).len(), 1);
        assert!(suggestions(&[]).is_empty());
    }

    #[test]
    fn no_match_falls_back_to_unrelated_suggestions() {
        let catalog = five_games();
        let view = catalog_view(&catalog, "zzz");
        assert!(view.shows_suggestions());
        match view {
            CatalogView::NoResults { suggestions } => {
                let ids: Vec<i64> = suggestions.iter().map(|g| g.id).collect();
                assert_eq!(ids, vec![1, 2, 3]);
            }
            CatalogView::Matches(_) => panic!("expected the no-results view"),
        }
    }

    #[test]
    fn empty_catalog_shows_no_results_without_suggestions() {
        let view = catalog_view(&[], "");
        assert_eq!(view, CatalogView::NoResults { suggestions: &[] });
    }

    #[test]
    fn matches_hide_suggestions() {
        let catalog = five_games();
        let view = catalog_view(&catalog, "kong");
        assert!(!view.shows_suggestions());
        assert_eq!(view, CatalogView::Matches(vec![&catalog[4]]));
    }
}
