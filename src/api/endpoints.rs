//! URL builders for the Riot and Data Dragon endpoints.

pub const DEFAULT_DDRAGON_BASE: &str = "https://ddragon.leagueoflegends.com";

pub fn account_by_riot_id(host: &str, name: &str, tag: &str) -> String {
    format!(
        "{}/riot/account/v1/accounts/by-riot-id/{}/{}",
        host,
        encode_segment(name),
        encode_segment(tag)
    )
}

pub fn match_ids_by_puuid(host: &str, puuid: &str, query: &str) -> String {
    format!(
        "{}/lol/match/v5/matches/by-puuid/{}/ids?{}",
        host,
        encode_segment(puuid),
        query
    )
}

pub fn match_by_id(host: &str, match_id: &str) -> String {
    format!("{}/lol/match/v5/matches/{}", host, encode_segment(match_id))
}

pub fn ddragon_versions(base: &str) -> String {
    format!("{base}/api/versions.json")
}

pub fn champion_icon(base: &str, version: &str, champion_name: &str) -> String {
    format!(
        "{}/cdn/{}/img/champion/{}.png",
        base,
        version,
        encode_segment(champion_name)
    )
}

/// Percent-encodes a single path segment. Game names may contain
/// spaces and non-ASCII characters.
fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
