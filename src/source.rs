//! Preset sequences available over HTTP.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteSource {
    BachPrelude,
    Dream,
}

impl RemoteSource {
    pub const ALL: [RemoteSource; 2] = [RemoteSource::BachPrelude, RemoteSource::Dream];

    pub fn url(self) -> &'static str {
        match self {
            RemoteSource::BachPrelude => "https://cdn.jsdelivr.net/gh/rafgim/NUEVO@main/1.mid",
            RemoteSource::Dream => "https://cdn.jsdelivr.net/gh/rafgim/NUEVO@main/2.mid",
        }
    }

    /// Display name shown once the sequence is loaded.
    pub fn name(self) -> &'static str {
        match self {
            RemoteSource::BachPrelude => "Preludio nº1 (Bach).mid",
            RemoteSource::Dream => "Dream nº1 (Rafael Gimeno).mid",
        }
    }
}

impl std::fmt::Display for RemoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
