//! Catalog listing: `seedsearch phrases`.

use anyhow::Result;

pub fn cmd_phrases(grep: Option<&str>) -> Result<()> {
    use seedsearch::catalog::PhraseCatalog;

    let phrases = PhraseCatalog::builtin().generate();
    for phrase in phrases
        .iter()
        .filter(|p| grep.is_none_or(|needle| p.text.contains(needle)))
    {
        println!("{:>5} {} {}", phrase.index, phrase.key, phrase.text);
    }
    Ok(())
}
