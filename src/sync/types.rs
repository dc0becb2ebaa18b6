//! Remote documents and the records stored locally

use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

use crate::sync::error::RemoteError;

/// Realm document as returned by the static data API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RealmDocument {
    /// Realm version, e.g. "5.15.1"
    pub v: String,
    /// CDN base used to build asset URLs
    pub cdn: String,
    pub profileiconmax: i64,
    /// Per-subsystem versions
    pub n: RealmVersions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RealmVersions {
    pub champion: String,
    pub summoner: String,
    pub language: String,
    pub map: String,
    pub item: String,
    pub mastery: String,
    pub rune: String,
    pub profileicon: String,
}

/// Champion document, keyed by champion key ("Aatrox", "Ahri", ...)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChampionDocument {
    pub data: IndexMap<String, ChampionEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChampionEntry {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub title: String,
    pub blurb: String,
    #[serde(default)]
    pub skins: Vec<SkinEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SkinEntry {
    pub id: i64,
    pub num: i64,
    pub name: String,
}

impl ChampionDocument {
    pub fn skin_count(&self) -> usize {
        self.data.values().map(|c| c.skins.len()).sum()
    }
}

/// Stored realm row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Realm {
    pub realm_version: String,
    pub cdn: String,
    pub champion_version: String,
    pub summoner_version: String,
    pub language_version: String,
    pub map_version: String,
    pub item_version: String,
    pub mastery_version: String,
    pub rune_version: String,
    pub profile_icon_version: String,
    pub profile_icon_max: i64,
}

impl From<&RealmDocument> for Realm {
    fn from(doc: &RealmDocument) -> Self {
        Self {
            realm_version: doc.v.clone(),
            cdn: doc.cdn.clone(),
            champion_version: doc.n.champion.clone(),
            summoner_version: doc.n.summoner.clone(),
            language_version: doc.n.language.clone(),
            map_version: doc.n.map.clone(),
            item_version: doc.n.item.clone(),
            mastery_version: doc.n.mastery.clone(),
            rune_version: doc.n.rune.clone(),
            profile_icon_version: doc.n.profileicon.clone(),
            profile_icon_max: doc.profileiconmax,
        }
    }
}

/// Stored champion row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Champion {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub title: String,
    pub blurb: String,
    pub image_url: String,
}

/// Stored champion skin row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChampionSkin {
    pub skin_id: i64,
    pub champion_id: i64,
    pub skin_number: i64,
    pub name: String,
    pub portrait_image_url: String,
    pub landscape_image_url: String,
}

/// Primary key of a champion skin row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkinId {
    pub skin_id: i64,
    pub skin_number: i64,
}

/// Image URLs collected while repopulating, one list per art kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUrls {
    pub square: Vec<String>,
    pub portrait: Vec<String>,
    pub landscape: Vec<String>,
}

impl ImageUrls {
    /// Portrait then landscape URLs, the second caching pass
    pub fn skin_art(&self) -> Vec<String> {
        [self.portrait.as_slice(), self.landscape.as_slice()].concat()
    }
}

/// Builds asset URLs by resolving relative paths against the realm CDN.
///
/// Paths are resolved as URL references, so a CDN of
/// `http://ddragon.leagueoflegends.com/cdn` produces
/// `http://ddragon.leagueoflegends.com/cdn/5.15.1/img/champion/Aatrox.png`.
#[derive(Debug, Clone)]
pub struct AssetUrls {
    cdn: Url,
    champion_version: String,
}

impl AssetUrls {
    pub fn new(cdn: &str, champion_version: &str) -> Result<Self, RemoteError> {
        let cdn = Url::parse(cdn).map_err(|e| RemoteError::Parse(format!("cdn {cdn:?}: {e}")))?;
        Ok(Self {
            cdn,
            champion_version: champion_version.to_string(),
        })
    }

    pub fn square(&self, key: &str) -> String {
        self.resolve(&format!(
            "cdn/{}/img/champion/{}.png",
            self.champion_version, key
        ))
    }

    pub fn portrait(&self, key: &str, skin_number: i64) -> String {
        self.resolve(&format!("cdn/img/champion/loading/{key}_{skin_number}.jpg"))
    }

    pub fn landscape(&self, key: &str, skin_number: i64) -> String {
        self.resolve(&format!("cdn/img/champion/splash/{key}_{skin_number}.jpg"))
    }

    fn resolve(&self, path: &str) -> String {
        // A relative path only fails to join against a cannot-be-a-base URL
        self.cdn
            .join(path)
            .map(String::from)
            .unwrap_or_else(|_| format!("{}/{}", self.cdn.as_str().trim_end_matches('/'), path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const REALM_JSON: &str = r#"{
        "v": "5.15.1",
        "cdn": "http://ddragon.leagueoflegends.com/cdn",
        "profileiconmax": 28,
        "l": "en_US",
        "n": {
            "champion": "5.15.1", "summoner": "5.15.1", "language": "5.15.1",
            "map": "5.15.1", "item": "5.15.1", "mastery": "5.15.1",
            "rune": "5.15.1", "profileicon": "5.15.1"
        }
    }"#;

    #[test]
    fn realm_from_document_maps_every_column() {
        let doc: RealmDocument = serde_json::from_str(REALM_JSON).unwrap();

        let realm = Realm::from(&doc);

        assert_eq!(realm.realm_version, "5.15.1");
        assert_eq!(realm.cdn, "http://ddragon.leagueoflegends.com/cdn");
        assert_eq!(realm.profile_icon_max, 28);
        assert_eq!(realm.profile_icon_version, "5.15.1");
        assert_eq!(realm.champion_version, "5.15.1");
    }

    #[test]
    fn champion_document_keeps_document_order_and_defaults_skins() {
        let doc: ChampionDocument = serde_json::from_str(
            r#"{
                "type": "champion",
                "data": {
                    "Zed": {"id": 238, "key": "Zed", "name": "Zed", "title": "the Master of Shadows", "blurb": "...",
                            "skins": [{"id": 238000, "num": 0, "name": "default"}, {"id": 238001, "num": 1, "name": "Shockblade Zed"}]},
                    "Aatrox": {"id": 266, "key": "Aatrox", "name": "Aatrox", "title": "the Darkin Blade", "blurb": "..."}
                }
            }"#,
        )
        .unwrap();

        let keys: Vec<_> = doc.data.keys().cloned().collect();
        assert_eq!(keys, vec!["Zed", "Aatrox"]);
        assert!(doc.data["Aatrox"].skins.is_empty());
        assert_eq!(doc.skin_count(), 2);
    }

    #[rstest]
    #[case(
        "http://ddragon.leagueoflegends.com/cdn",
        "http://ddragon.leagueoflegends.com/cdn/5.15.1/img/champion/Aatrox.png",
        "http://ddragon.leagueoflegends.com/cdn/img/champion/loading/Aatrox_2.jpg",
        "http://ddragon.leagueoflegends.com/cdn/img/champion/splash/Aatrox_2.jpg"
    )]
    #[case(
        "http://127.0.0.1:8080",
        "http://127.0.0.1:8080/cdn/5.15.1/img/champion/Aatrox.png",
        "http://127.0.0.1:8080/cdn/img/champion/loading/Aatrox_2.jpg",
        "http://127.0.0.1:8080/cdn/img/champion/splash/Aatrox_2.jpg"
    )]
    fn asset_urls_resolve_against_cdn(
        #[case] cdn: &str,
        #[case] square: &str,
        #[case] portrait: &str,
        #[case] landscape: &str,
    ) {
        let urls = AssetUrls::new(cdn, "5.15.1").unwrap();

        assert_eq!(urls.square("Aatrox"), square);
        assert_eq!(urls.portrait("Aatrox", 2), portrait);
        assert_eq!(urls.landscape("Aatrox", 2), landscape);
    }

    #[test]
    fn asset_urls_rejects_unparseable_cdn() {
        assert!(matches!(
            AssetUrls::new("not a url", "5.15.1"),
            Err(RemoteError::Parse(_))
        ));
    }

    #[test]
    fn skin_art_concatenates_portrait_then_landscape() {
        let urls = ImageUrls {
            square: vec!["s".to_string()],
            portrait: vec!["p1".to_string(), "p2".to_string()],
            landscape: vec!["l1".to_string()],
        };

        assert_eq!(urls.skin_art(), vec!["p1", "p2", "l1"]);
    }
}
