use rand::Rng;

use crate::backend::{RawVideo, current_year};
use crate::catalog::{self, Catalog};
use crate::feed::item::{Challenge, FeedItem, Quiz, Video, VideoLocation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternToken {
    Video,
    Quiz,
    Challenge,
}

/// One interactive item after every two videos, alternating quiz and challenge.
pub const FEED_PATTERN: [PatternToken; 6] = [
    PatternToken::Video,
    PatternToken::Video,
    PatternToken::Quiz,
    PatternToken::Video,
    PatternToken::Video,
    PatternToken::Challenge,
];

/// How interactive cards are numbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardNumbering {
    /// Quizzes and challenges each count from zero: `quiz-0`, `challenge-0`, `quiz-1`.
    PerKind,
    /// One counter shared by both kinds: `quiz-0`, `challenge-1`, `quiz-2`.
    Shared,
}

/// Number of topic videos in the offline feed (plus one interactive item per pair).
pub const SYNTHETIC_VIDEO_COUNT: usize = 12;

const GENERATED_TITLE: &str = "AI Generated Sustainability Story";
const GENERATED_DESCRIPTION: &str = "Empathetic story about environmental and social impact";

pub struct FeedComposer {
    base_url: String,
}

impl FeedComposer {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build one scroll session from backend videos, or the offline topic
    /// feed when there are none. `rng` only feeds the like/comment counters.
    pub fn compose<R: Rng + ?Sized>(&self, videos: &[RawVideo], rng: &mut R) -> Vec<FeedItem> {
        if videos.is_empty() {
            tracing::info!("no backend videos, composing offline topic feed");
            return self.synthetic_feed(rng);
        }
        let year = current_year();
        interleave(
            videos.iter().map(|raw| self.backend_video(raw, year, rng)),
            &catalog::FEED,
            CardNumbering::PerKind,
        )
    }

    pub fn synthetic_feed<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<FeedItem> {
        interleave(
            (0..SYNTHETIC_VIDEO_COUNT).map(|i| topic_video(i, rng)),
            &catalog::OFFLINE,
            CardNumbering::Shared,
        )
    }

    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn backend_video<R: Rng + ?Sized>(&self, raw: &RawVideo, year: i32, rng: &mut R) -> Video {
        let title = raw
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(GENERATED_TITLE);
        Video {
            id: raw.id.clone(),
            title: title.to_string(),
            description: GENERATED_DESCRIPTION.to_string(),
            media_url: Some(self.resolve_url(&raw.url)),
            subtitle_url: raw.subtitle_url.as_deref().map(|s| self.resolve_url(s)),
            thumbnail_url: placeholder_thumbnail(&raw.id),
            creator: "Arogya Sathi AI".to_string(),
            location: VideoLocation {
                name: "India".to_string(),
                region: "Generated with Real Weather Data".to_string(),
            },
            year: raw.created_year(year),
            category: "ai-generated".to_string(),
            is_personalized: false,
            likes: rng.gen_range(500..5500),
            comments: rng.gen_range(20..220),
        }
    }
}

/// Walk `FEED_PATTERN` cyclically, stopping at the first video token once
/// `videos` is exhausted. The card number is both the id suffix and the
/// template index into `catalog`.
pub fn interleave<I>(videos: I, catalog: &Catalog, numbering: CardNumbering) -> Vec<FeedItem>
where
    I: IntoIterator<Item = Video>,
{
    let mut videos = videos.into_iter();
    let mut items = Vec::new();
    let mut quiz_idx = 0;
    let mut challenge_idx = 0;
    let mut card_idx = 0;

    for token in FEED_PATTERN.iter().cycle() {
        match token {
            PatternToken::Video => match videos.next() {
                Some(video) => items.push(FeedItem::Video(video)),
                None => break,
            },
            PatternToken::Quiz => {
                let n = match numbering {
                    CardNumbering::PerKind => quiz_idx,
                    CardNumbering::Shared => card_idx,
                };
                items.push(FeedItem::Quiz(Quiz::from_template(
                    format!("quiz-{n}"),
                    catalog.quiz(n),
                )));
                quiz_idx += 1;
                card_idx += 1;
            }
            PatternToken::Challenge => {
                let n = match numbering {
                    CardNumbering::PerKind => challenge_idx,
                    CardNumbering::Shared => card_idx,
                };
                items.push(FeedItem::Challenge(Challenge::from_template(
                    format!("challenge-{n}"),
                    catalog.challenge(n),
                )));
                challenge_idx += 1;
                card_idx += 1;
            }
        }
    }

    items
}

fn topic_video<R: Rng + ?Sized>(index: usize, rng: &mut R) -> Video {
    let topic = catalog::topic(index);
    Video {
        id: format!("video-{index}"),
        title: topic.title.to_string(),
        description: topic.description.to_string(),
        media_url: None,
        subtitle_url: None,
        thumbnail_url: placeholder_thumbnail(&format!("climate{index}")),
        creator: "Arogya Setu".to_string(),
        location: VideoLocation {
            name: topic.location.to_string(),
            region: "Your Region".to_string(),
        },
        year: 2025 + index as i32 * 5,
        category: catalog::topic_category(index).to_string(),
        is_personalized: false,
        likes: rng.gen_range(1000..11000),
        comments: rng.gen_range(50..550),
    }
}

pub fn placeholder_thumbnail(seed: &str) -> String {
    format!("https://picsum.photos/seed/{seed}/1920/1080")
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::feed::item::FeedKind;

    fn raw_videos(n: usize) -> Vec<RawVideo> {
        (0..n)
            .map(|i| RawVideo {
                id: format!("gen-{i}"),
                url: format!("/api/video/story_{i}.mp4"),
                title: Some(format!("Story {i}")),
                subtitle_url: None,
                created_at: "2030-06-01T12:00:00".to_string(),
                filename: None,
            })
            .collect()
    }

    fn ids(items: &[FeedItem]) -> Vec<&str> {
        items.iter().map(|i| i.id()).collect()
    }

    #[test]
    fn test_five_videos_layout() {
        let composer = FeedComposer::new("http://localhost:8000");
        let feed = composer.compose(&raw_videos(5), &mut StepRng::new(0, 0));
        assert_eq!(
            ids(&feed),
            vec!["gen-0", "gen-1", "quiz-0", "gen-2", "gen-3", "challenge-0", "gen-4"]
        );
    }

    #[test]
    fn test_interactive_never_adjacent() {
        let composer = FeedComposer::new("http://localhost:8000");
        for n in 0..40 {
            let feed = composer.compose(&raw_videos(n), &mut StepRng::new(1, 1));
            for pair in feed.windows(2) {
                assert!(
                    !(pair[0].is_interactive() && pair[1].is_interactive()),
                    "adjacent interactive items with {n} videos"
                );
            }
        }
    }

    #[test]
    fn test_video_count_and_order_preserved() {
        let composer = FeedComposer::new("http://localhost:8000");
        for n in 1..30 {
            let input = raw_videos(n);
            let feed = composer.compose(&input, &mut StepRng::new(0, 0));
            let video_ids: Vec<&str> = feed
                .iter()
                .filter(|i| i.kind() == FeedKind::Video)
                .map(|i| i.id())
                .collect();
            let expected: Vec<&str> = input.iter().map(|v| v.id.as_str()).collect();
            assert_eq!(video_ids, expected);

            let interactive: Vec<FeedKind> = feed
                .iter()
                .filter(|i| i.is_interactive())
                .map(|i| i.kind())
                .collect();
            assert_eq!(interactive.len(), n / 2);
            for (k, kind) in interactive.iter().enumerate() {
                let expected = if k % 2 == 0 { FeedKind::Quiz } else { FeedKind::Challenge };
                assert_eq!(*kind, expected);
            }
        }
    }

    #[test]
    fn test_templates_cycle_when_exhausted() {
        let composer = FeedComposer::new("http://localhost:8000");
        let len = catalog::FEED.quizzes.len();
        let n = 4 * (len + 1);
        let feed = composer.compose(&raw_videos(n), &mut StepRng::new(0, 0));
        let quizzes: Vec<&FeedItem> = feed
            .iter()
            .filter(|i| i.kind() == FeedKind::Quiz)
            .collect();
        assert!(quizzes.len() > len);
        assert_eq!(quizzes[len].title(), quizzes[0].title());
        assert_eq!(quizzes[len].id(), format!("quiz-{len}"));

        let challenges: Vec<&str> = feed
            .iter()
            .filter(|i| i.kind() == FeedKind::Challenge)
            .map(|i| i.title())
            .collect();
        assert_eq!(challenges[5], "Energy Free Hour");
    }

    #[test]
    fn test_empty_input_falls_back_to_topic_feed() {
        let composer = FeedComposer::new("http://localhost:8000");
        let feed = composer.compose(&[], &mut StepRng::new(0, 0));
        assert_eq!(feed.len(), 18);
        let videos = feed.iter().filter(|i| i.kind() == FeedKind::Video).count();
        assert_eq!(videos, 12);
        assert_eq!(feed[0].id(), "video-0");

        let cards: Vec<(&str, &str)> = feed
            .iter()
            .filter(|i| i.is_interactive())
            .map(|i| (i.id(), i.title()))
            .collect();
        assert_eq!(
            cards,
            vec![
                ("quiz-0", "What is the greenhouse effect?"),
                ("challenge-1", "Water a Plant Challenge"),
                ("quiz-2", "What does carbon footprint mean?"),
                ("challenge-3", "Plant a Tree Challenge"),
                ("quiz-4", "Which pollutes water most?"),
                ("challenge-5", "Composting Starter"),
            ]
        );
        assert_eq!(feed[2].id(), "quiz-0");
        assert_eq!(feed[5].id(), "challenge-1");
        assert_eq!(feed[17].id(), "challenge-5");

        match &feed[3] {
            FeedItem::Video(v) => {
                assert_eq!(v.id, "video-2");
                assert_eq!(v.year, 2035);
                assert_eq!(v.category, "future-vision");
                assert!(v.media_url.is_none());
            }
            other => panic!("expected video, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_composition_independent_of_rng() {
        let composer = FeedComposer::new("http://localhost:8000");
        let a = composer.compose(&raw_videos(9), &mut StepRng::new(0, 0));
        let b = composer.compose(&raw_videos(9), &mut StepRng::new(u64::MAX / 3, 7919));
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(
            ids(&composer.synthetic_feed(&mut StepRng::new(0, 0))),
            ids(&composer.synthetic_feed(&mut StepRng::new(42, 42)))
        );
    }

    #[test]
    fn test_backend_video_mapping() {
        let composer = FeedComposer::new("http://localhost:8000/");
        let mut input = raw_videos(1);
        input[0].title = Some("   ".to_string());
        input[0].subtitle_url = Some("/api/subtitles/story_0.vtt".to_string());
        let feed = composer.compose(&input, &mut StepRng::new(0, 0));
        match &feed[0] {
            FeedItem::Video(v) => {
                assert_eq!(v.title, GENERATED_TITLE);
                assert_eq!(
                    v.media_url.as_deref(),
                    Some("http://localhost:8000/api/video/story_0.mp4")
                );
                assert_eq!(
                    v.subtitle_url.as_deref(),
                    Some("http://localhost:8000/api/subtitles/story_0.vtt")
                );
                assert_eq!(v.year, 2030);
                assert_eq!(v.likes, 500);
                assert!(!v.is_personalized);
            }
            other => panic!("expected video, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_resolve_url_keeps_absolute() {
        let composer = FeedComposer::new("http://localhost:8000");
        assert_eq!(
            composer.resolve_url("https://cdn.example.org/a.mp4"),
            "https://cdn.example.org/a.mp4"
        );
        assert_eq!(composer.resolve_url("a.mp4"), "http://localhost:8000/a.mp4");
    }
}
