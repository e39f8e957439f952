const TRANSFERMARKT_SEARCH: &str =
    "https://www.transfermarkt.com/schnellsuche/ergebnis/schnellsuche?query=";

pub fn transfermarkt_search_url(name: &str) -> String {
    let query = name
        .split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+");
    format!("{TRANSFERMARKT_SEARCH}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_become_plus() {
        assert_eq!(
            transfermarkt_search_url("Lamine Yamal"),
            "https://www.transfermarkt.com/schnellsuche/ergebnis/schnellsuche?query=Lamine+Yamal"
        );
    }

    #[test]
    fn accents_and_extra_whitespace_are_encoded() {
        let url = transfermarkt_search_url("  Pau  Cubarsí ");
        assert!(url.ends_with("query=Pau+Cubars%C3%AD"));
    }
}
