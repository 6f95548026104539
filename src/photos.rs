// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! City photo carousel.
//!
//! Photos are looked up by a fixed list of candidate filenames. Candidates
//! are tried one at a time; each success joins the carousel, each failure
//! moves on. When every candidate has failed the gallery shows a text
//! placeholder instead of a broken image.

/// Shown when no photo could be loaded
pub const PHOTO_PLACEHOLDER: &str = "Красивый исторический центр";

/// Candidate photo filenames for a city, in load order
pub fn photo_candidates(slug: &str) -> Vec<String> {
    let mut names = vec![format!("historic_{slug}.png")];
    names.extend((2..=10).map(|i| format!("historic_{slug}_{i}.png")));
    names.extend((1..=3).map(|i| format!("landmark_{slug}_{i}.png")));
    names.extend((1..=6).map(|i| format!("city_{slug}_{i}.png")));
    names
}

/// What the photo slot should display.
#[derive(Debug, PartialEq)]
pub enum GalleryView<'a, T> {
    Loading,
    Photo { photo: &'a T, index: usize, count: usize },
    Placeholder,
}

/// Sequential loader and carousel over photo candidates.
#[derive(Debug)]
pub struct PhotoGallery<T> {
    candidates: Vec<String>,
    next_candidate: usize,
    in_flight: Option<usize>,
    photos: Vec<T>,
    current: usize,
}

impl<T> PhotoGallery<T> {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            next_candidate: 0,
            in_flight: None,
            photos: Vec::new(),
            current: 0,
        }
    }

    pub fn for_city(slug: &str) -> Self {
        Self::new(photo_candidates(slug))
    }

    /// Next candidate to request as `(index, filename)`.
    ///
    /// Returns `None` while a request is in flight or once all were tried.
    pub fn next_request(&mut self) -> Option<(usize, String)> {
        if self.in_flight.is_some() || self.next_candidate >= self.candidates.len() {
            return None;
        }
        let index = self.next_candidate;
        self.next_candidate += 1;
        self.in_flight = Some(index);
        Some((index, self.candidates[index].clone()))
    }

    /// Record the outcome for candidate `index`. Unexpected indices are ignored.
    pub fn complete(&mut self, index: usize, photo: Option<T>) {
        if self.in_flight != Some(index) {
            return;
        }
        self.in_flight = None;
        if let Some(photo) = photo {
            self.photos.push(photo);
        }
    }

    fn exhausted(&self) -> bool {
        self.in_flight.is_none() && self.next_candidate >= self.candidates.len()
    }

    pub fn view(&self) -> GalleryView<'_, T> {
        match self.photos.get(self.current) {
            Some(photo) => GalleryView::Photo {
                photo,
                index: self.current,
                count: self.photos.len(),
            },
            None if self.exhausted() => GalleryView::Placeholder,
            None => GalleryView::Loading,
        }
    }

    pub fn show_next(&mut self) {
        if !self.photos.is_empty() {
            self.current = (self.current + 1) % self.photos.len();
        }
    }

    pub fn show_previous(&mut self) {
        if !self.photos.is_empty() {
            self.current = (self.current + self.photos.len() - 1) % self.photos.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order() {
        let names = photo_candidates("kazan");
        assert_eq!(names.len(), 1 + 9 + 3 + 6);
        assert_eq!(names[0], "historic_kazan.png");
        assert_eq!(names[1], "historic_kazan_2.png");
        assert_eq!(names[10], "landmark_kazan_1.png");
        assert_eq!(names.last().unwrap(), "city_kazan_6.png");
    }

    #[test]
    fn test_all_failures_end_in_placeholder() {
        let mut gallery: PhotoGallery<u32> = PhotoGallery::for_city("omsk");
        let mut attempts = 0;
        while let Some((index, _)) = gallery.next_request() {
            assert_eq!(gallery.view(), GalleryView::Loading);
            gallery.complete(index, None);
            attempts += 1;
        }
        assert_eq!(attempts, 19);
        assert_eq!(gallery.view(), GalleryView::Placeholder);
    }

    #[test]
    fn test_one_request_at_a_time() {
        let mut gallery: PhotoGallery<u32> = PhotoGallery::new(vec!["a".into(), "b".into()]);
        assert_eq!(gallery.next_request(), Some((0, "a".to_string())));
        assert_eq!(gallery.next_request(), None);
        // A stale completion does not unblock the queue
        gallery.complete(1, Some(9));
        assert_eq!(gallery.next_request(), None);
        gallery.complete(0, None);
        assert_eq!(gallery.next_request(), Some((1, "b".to_string())));
    }

    #[test]
    fn test_carousel_wraps() {
        let mut gallery = PhotoGallery::new(vec!["a".into(), "b".into(), "c".into()]);
        for photo in [10, 20, 30] {
            let (index, _) = gallery.next_request().unwrap();
            gallery.complete(index, Some(photo));
        }
        assert_eq!(gallery.photos.len(), 3);
        assert_eq!(gallery.view(), GalleryView::Photo { photo: &10, index: 0, count: 3 });

        gallery.show_previous();
        assert_eq!(gallery.view(), GalleryView::Photo { photo: &30, index: 2, count: 3 });
        gallery.show_next();
        gallery.show_next();
        assert_eq!(gallery.view(), GalleryView::Photo { photo: &20, index: 1, count: 3 });
    }

    #[test]
    fn test_first_success_shows_before_rest_load() {
        let mut gallery = PhotoGallery::new(vec!["a".into(), "b".into()]);
        let (index, _) = gallery.next_request().unwrap();
        gallery.complete(index, Some("photo"));
        assert!(matches!(gallery.view(), GalleryView::Photo { count: 1, .. }));
    }
}
