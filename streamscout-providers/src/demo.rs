//! Demo provider catalogue for development without a sidecar.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use streamscout_core::stream::{FileStream, HlsStream, StreamFile, UNKNOWN_QUALITY};
use streamscout_core::urls::{is_playlist_url, is_video_url};
use streamscout_core::{
    EmbedDescriptor, EmbedMeta, EmbedScrapeOutput, MediaKind, MediaQuery, ProviderError,
    ProviderFactory, ProviderRegistry, RunOutput, ScraperKind, ScraperMeta, SourceDescriptor,
    SourceScrapeOutput, Stream,
};

const EMBED_HOST: &str = "https://embed.streamscout.dev";
const CDN_HOST: &str = "https://cdn.streamscout.dev";

/// A demo embed scraper: id, rank and the file it "finds" on the CDN.
struct DemoEmbed {
    id: &'static str,
    name: &'static str,
    rank: i64,
    file: &'static str,
}

static EMBEDS: [DemoEmbed; 3] = [
    DemoEmbed {
        id: "demo-stream",
        name: "Demo Stream",
        rank: 300,
        file: "master.m3u8",
    },
    DemoEmbed {
        id: "demo-mirror",
        name: "Demo Mirror",
        rank: 250,
        file: "1080.mp4",
    },
    DemoEmbed {
        id: "demo-lowres",
        name: "Demo Lowres",
        rank: 100,
        file: "video.mp4",
    },
];

/// Deterministic offline provider.
///
/// Two sources: `demo-flix` (movies and shows) links every demo embed plus
/// an unlisted legacy embed; `demo-archive` (movies only) links the mirror.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoProviders;

impl DemoProviders {
    /// Creates the demo catalogue.
    pub fn new() -> Self {
        Self
    }

    fn sources() -> Vec<SourceDescriptor> {
        vec![
            ScraperMeta {
                id: "demo-flix".to_string(),
                name: "Demo Flix".to_string(),
                rank: 200,
                kind: ScraperKind::Source,
                media_types: Some(vec!["movie".to_string(), "show".to_string()]),
            },
            ScraperMeta {
                id: "demo-archive".to_string(),
                name: "Demo Archive".to_string(),
                rank: 100,
                kind: ScraperKind::Source,
                media_types: Some(vec!["movie".to_string()]),
            },
        ]
    }

    fn embed_ids_for(source_id: &str, media: &MediaQuery) -> Option<Vec<&'static str>> {
        match (source_id, &media.kind) {
            ("demo-flix", _) => Some(vec![
                "demo-lowres",
                "demo-legacy",
                "demo-stream",
                "demo-mirror",
            ]),
            ("demo-archive", MediaKind::Movie) => Some(vec!["demo-mirror"]),
            _ => None,
        }
    }

    fn embed_url(embed_id: &str, media: &MediaQuery) -> String {
        match &media.kind {
            MediaKind::Movie => format!("{EMBED_HOST}/{embed_id}/movie/{}", media.tmdb_id),
            MediaKind::Show { season, episode } => format!(
                "{EMBED_HOST}/{embed_id}/show/{}/{}/{}",
                media.tmdb_id, season.number, episode.number
            ),
        }
    }

    /// Builds the stream a demo embed "finds" at `url`.
    fn stream_for(embed: &DemoEmbed, url: &str) -> Option<Stream> {
        let path = url.strip_prefix(EMBED_HOST)?;
        let stream_url = format!("{CDN_HOST}{path}/{}", embed.file);

        if is_playlist_url(&stream_url) {
            return Some(Stream::Hls(HlsStream {
                id: "primary".to_string(),
                playlist: stream_url,
                flags: vec!["cors-allowed".to_string()],
                captions: Vec::new(),
                headers: None,
                preferred_headers: None,
                extra: Default::default(),
            }));
        }

        if is_video_url(&stream_url) {
            let quality = embed
                .file
                .strip_suffix(".mp4")
                .filter(|label| label.chars().all(|c| c.is_ascii_digit()))
                .unwrap_or(UNKNOWN_QUALITY);
            let qualities = BTreeMap::from([(
                quality.to_string(),
                StreamFile {
                    file_type: "mp4".to_string(),
                    url: stream_url,
                },
            )]);
            return Some(Stream::File(FileStream {
                id: "primary".to_string(),
                flags: Vec::new(),
                qualities,
                captions: Vec::new(),
                headers: None,
                preferred_headers: None,
                extra: Default::default(),
            }));
        }

        None
    }
}

#[async_trait]
impl ProviderRegistry for DemoProviders {
    async fn list_sources(&self) -> Result<Vec<SourceDescriptor>, ProviderError> {
        Ok(Self::sources())
    }

    async fn list_embeds(&self) -> Result<Vec<EmbedMeta>, ProviderError> {
        Ok(EMBEDS
            .iter()
            .map(|embed| ScraperMeta {
                id: embed.id.to_string(),
                name: embed.name.to_string(),
                rank: embed.rank,
                kind: ScraperKind::Embed,
                media_types: None,
            })
            .collect())
    }

    async fn run_source_scraper(
        &self,
        source_id: &str,
        media: &MediaQuery,
    ) -> Result<SourceScrapeOutput, ProviderError> {
        let embed_ids =
            Self::embed_ids_for(source_id, media).ok_or_else(|| ProviderError::not_found(source_id))?;

        Ok(SourceScrapeOutput {
            embeds: embed_ids
                .into_iter()
                .map(|embed_id| EmbedDescriptor {
                    embed_id: embed_id.to_string(),
                    url: Self::embed_url(embed_id, media),
                })
                .collect(),
        })
    }

    async fn run_embed_scraper(
        &self,
        embed_id: &str,
        url: &str,
    ) -> Result<EmbedScrapeOutput, ProviderError> {
        let embed = EMBEDS
            .iter()
            .find(|embed| embed.id == embed_id)
            .ok_or_else(|| ProviderError::not_found(embed_id))?;
        let stream = Self::stream_for(embed, url).ok_or_else(|| {
            ProviderError::other(embed_id, format!("Unrecognised embed URL: {url}"))
        })?;

        Ok(EmbedScrapeOutput {
            stream: vec![stream],
        })
    }

    async fn run_all(&self, media: &MediaQuery) -> Result<Option<RunOutput>, ProviderError> {
        let mut sources = Self::sources();
        sources.sort_by(|a, b| b.rank.cmp(&a.rank));

        for source in sources {
            let Ok(scraped) = self.run_source_scraper(&source.id, media).await else {
                continue;
            };

            let mut embeds: Vec<(&DemoEmbed, EmbedDescriptor)> = scraped
                .embeds
                .into_iter()
                .filter_map(|descriptor| {
                    EMBEDS
                        .iter()
                        .find(|embed| embed.id == descriptor.embed_id)
                        .map(|embed| (embed, descriptor))
                })
                .collect();
            embeds.sort_by(|(a, _), (b, _)| b.rank.cmp(&a.rank));

            for (embed, descriptor) in embeds {
                if let Some(stream) = Self::stream_for(embed, &descriptor.url) {
                    return Ok(Some(RunOutput {
                        source_id: source.id,
                        embed_id: Some(descriptor.embed_id),
                        stream,
                        extra: Default::default(),
                    }));
                }
            }
        }

        Ok(None)
    }
}

/// Factory for the demo catalogue. The catalogue holds no state.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoFactory;

impl ProviderFactory for DemoFactory {
    fn build(&self) -> Arc<dyn ProviderRegistry> {
        Arc::new(DemoProviders::new())
    }
}

#[cfg(test)]
mod tests {
    use streamscout_core::media::{EpisodeRef, SeasonRef};
    use streamscout_core::{ResponseShape, StreamAggregator, StreamResponse};

    use super::*;

    fn show() -> MediaQuery {
        MediaQuery::episode(
            "Dark",
            2017,
            "70523",
            SeasonRef {
                number: 1,
                tmdb_id: "88101".to_string(),
                title: None,
            },
            EpisodeRef {
                number: 3,
                tmdb_id: "1339483".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_embed_urls_encode_the_media() {
        let providers = DemoProviders::new();

        let scraped = providers.run_source_scraper("demo-flix", &show()).await.unwrap();

        assert_eq!(
            scraped.embeds[0].url,
            "https://embed.streamscout.dev/demo-lowres/show/70523/1/3"
        );
    }

    #[tokio::test]
    async fn test_archive_has_no_shows() {
        let providers = DemoProviders::new();

        let error = providers
            .run_source_scraper("demo-archive", &show())
            .await
            .unwrap_err();

        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_streams_are_classified_by_extension() {
        let providers = DemoProviders::new();
        let url = "https://embed.streamscout.dev/x/movie/949";

        let hls = providers.run_embed_scraper("demo-stream", url).await.unwrap();
        let mirror = providers.run_embed_scraper("demo-mirror", url).await.unwrap();
        let lowres = providers.run_embed_scraper("demo-lowres", url).await.unwrap();

        assert_eq!(hls.stream[0].type_name(), "hls");
        assert_eq!(mirror.stream[0].type_name(), "file");
        assert!(!mirror.stream[0].has_only_unknown_quality());
        assert!(lowres.stream[0].has_only_unknown_quality());
    }

    #[tokio::test]
    async fn test_unknown_embed_url_is_a_failure() {
        let providers = DemoProviders::new();

        let error = providers
            .run_embed_scraper("demo-stream", "https://elsewhere.example/1")
            .await
            .unwrap_err();

        assert!(!error.is_not_found());
    }

    #[tokio::test]
    async fn test_single_source_resolution_over_demo_catalogue() {
        let providers = DemoProviders::new();
        let media = MediaQuery::movie("Heat", 1995, "949");

        let response = StreamAggregator::new(&providers)
            .resolve(Some("demo-flix"), &media, ResponseShape::Normalized)
            .await
            .unwrap();

        // Unlisted legacy embed goes first and finds nothing, lowres is filtered.
        let StreamResponse::Normalized(result) = response else {
            panic!("expected normalized response");
        };
        assert_eq!(result.source_id.as_deref(), Some("demo-flix"));
        let kinds: Vec<&str> = result.streams.iter().map(Stream::type_name).collect();
        assert_eq!(kinds, vec!["hls", "file"]);
    }

    #[tokio::test]
    async fn test_run_all_picks_best_ranked_source_and_embed() {
        let providers = DemoProviders::new();
        let media = MediaQuery::movie("Heat", 1995, "949");

        let output = providers.run_all(&media).await.unwrap().unwrap();

        assert_eq!(output.source_id, "demo-flix");
        assert_eq!(output.embed_id.as_deref(), Some("demo-stream"));
    }
}
