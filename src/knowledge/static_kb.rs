use super::KnowledgeRetriever;
use crate::intent::normalize;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

/// Entries returned per lookup.
const MAX_RESULTS: usize = 2;
/// Minimum relevance for an entry to be returned at all.
const MIN_SCORE: u32 = 2;
/// Weight of a keyword hit relative to a plain body-word hit.
const KEYWORD_WEIGHT: u32 = 3;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "your", "with", "this", "that", "has",
    "have", "was", "very", "can", "how", "why", "what", "my", "is", "it", "its", "too",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub title: &'static str,
    pub body: &'static str,
    pub keywords: &'static [&'static str],
}

static ENTRIES: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        title: "Improving WiFi signal strength",
        body: "A signal between -30 and -50 dBm is excellent and -50 to -70 dBm is workable; \
               below that, throughput and stability suffer. Every doubling of distance costs \
               about 6 dB and a wall, mirror or fish tank can cost 10 to 20 dB more. Put the \
               router near the middle of the home and a metre or two off the floor, keep it \
               away from microwaves and Bluetooth hubs, check the antenna orientation, and add \
               a mesh node or extender for rooms the router cannot reach.",
        keywords: &["signal", "weak", "dbm", "range", "coverage", "extender", "mesh", "antenna"],
    },
    KnowledgeEntry {
        title: "Congestion, bands and bandwidth",
        body: "When many devices share one access point they compete for airtime. The 2.4GHz \
               band has only three non-overlapping channels (1, 6 and 11) while 5GHz has many \
               more, so move heavy traffic such as streaming to 5GHz where the signal allows. \
               Enable QoS on the router to favour calls and games, wire stationary devices, and \
               schedule large downloads outside busy hours. WiFi 6 hardware handles crowded \
               networks noticeably better.",
        keywords: &[
            "slow", "speed", "congestion", "bandwidth", "band", "channel", "5ghz", "qos",
            "streaming", "buffering",
        ],
    },
    KnowledgeEntry {
        title: "Securing a home network",
        body: "Use WPA3 (or WPA2-AES where older devices need it), replace the default admin \
               password, choose a passphrase of at least 12 characters, and turn off WPS. Put \
               visitors and smart-home gadgets on a guest network, keep router firmware up to \
               date, and review the list of connected devices for anything unfamiliar.",
        keywords: &[
            "security", "secure", "password", "wpa3", "wpa2", "encryption", "guest", "firmware",
            "hacked",
        ],
    },
    KnowledgeEntry {
        title: "Troubleshooting step by step",
        body: "Work from the bottom up: power and cables first, then the wireless link, then \
               IP configuration and DNS, then the application. Establish which devices are \
               affected, test one change at a time, and confirm each fix with a fresh \
               measurement. A speed test, ping to the gateway and a DNS lookup together locate \
               most faults quickly.",
        keywords: &[
            "troubleshoot", "troubleshooting", "steps", "diagnose", "problem", "internet",
            "connection", "dns",
        ],
    },
];

fn terms(text: &str) -> HashSet<String> {
    normalize(text)
        .split(' ')
        .filter(|t| t.len() >= 3 && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Built-in advice, ranked by keyword overlap with the query.
#[derive(Debug, Clone)]
pub struct StaticKnowledgeBase {
    entries: &'static [KnowledgeEntry],
}

impl Default for StaticKnowledgeBase {
    fn default() -> Self {
        Self { entries: ENTRIES }
    }
}

impl StaticKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    fn score(entry: &KnowledgeEntry, query_terms: &HashSet<String>) -> u32 {
        let body_terms = terms(entry.body);
        query_terms
            .iter()
            .map(|term| {
                if entry.keywords.contains(&term.as_str()) {
                    KEYWORD_WEIGHT
                } else {
                    u32::from(body_terms.contains(term))
                }
            })
            .sum()
    }

    /// The best matching entries, most relevant first.
    pub fn search(&self, query: &str) -> Vec<&KnowledgeEntry> {
        let query_terms = terms(query);
        let mut ranked: Vec<(u32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (Self::score(e, &query_terms), i))
            .filter(|(score, _)| *score >= MIN_SCORE)
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked
            .into_iter()
            .take(MAX_RESULTS)
            .map(|(_, i)| &self.entries[i])
            .collect()
    }
}

impl KnowledgeRetriever for StaticKnowledgeBase {
    fn name(&self) -> &str {
        "static"
    }

    fn lookup<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let text = self
                .search(query)
                .iter()
                .map(|e| format!("{}: {}", e.title, e.body))
                .collect::<Vec<_>>()
                .join("\n\n");
            Ok(text)
        })
    }
}
