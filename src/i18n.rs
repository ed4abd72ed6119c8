/// Gallery strings in both page languages
///
/// Only the strings the gallery section shows live here. The choice of
/// language lasts for the session.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Zh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Title,
    Subtitle,
    Placeholder,
    Loading,
    LoadMore,
    LoadError,
    Retry,
    Refresh,
    EndOfGallery,
    Music,
    SwitchLanguage,
    FullImageFailed,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Zh,
            Language::Zh => Language::En,
        }
    }

    pub fn t(self, key: Key) -> &'static str {
        use Key::*;
        match (self, key) {
            (Language::En, Title) => "Photo Gallery",
            (Language::Zh, Title) => "相册",
            (Language::En, Subtitle) => "Treasured memories captured in time",
            (Language::Zh, Subtitle) => "定格的珍贵记忆",
            (Language::En, Placeholder) => "No photos have been shared yet.",
            (Language::Zh, Placeholder) => "暂时还没有照片。",
            (Language::En, Loading) => "Loading photos…",
            (Language::Zh, Loading) => "正在加载照片…",
            (Language::En, LoadMore) => "Load more",
            (Language::Zh, LoadMore) => "加载更多",
            (Language::En, LoadError) => "Failed to load photos",
            (Language::Zh, LoadError) => "照片加载失败",
            (Language::En, Retry) => "Try again",
            (Language::Zh, Retry) => "重试",
            (Language::En, Refresh) => "Refresh",
            (Language::Zh, Refresh) => "刷新",
            (Language::En, EndOfGallery) => "You have seen every photo",
            (Language::Zh, EndOfGallery) => "已显示全部照片",
            (Language::En, Music) => "Music",
            (Language::Zh, Music) => "音乐",
            (Language::En, SwitchLanguage) => "中文",
            (Language::Zh, SwitchLanguage) => "English",
            (Language::En, FullImageFailed) => "Could not load the full-size photo",
            (Language::Zh, FullImageFailed) => "原图加载失败",
        }
    }
}
