//! Book aggregation over a flattened book × genre × author result set.

use bridge_traits::database::RowStream;
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::mapping::RowMapper;
use crate::models::{Author, AuthorId, Book, BookId, Genre, GenreId};

/// Collapses joined rows into one [`Book`] per book id.
///
/// The book→genres and book→authors joins are independent, so a book with two
/// genres and three authors arrives as six rows. The reader keeps one identity
/// cache per entity type, keyed by id; the first row that carries an id
/// decides the entity and later rows only add relations. Genre and author ids
/// that are NULL or 0 come from a join that matched nothing and are skipped.
///
/// Caches live for a single [`aggregate`](Self::aggregate) call, so
/// concurrent calls never share state.
pub struct AggregatingResultSetReader;

impl AggregatingResultSetReader {
    /// Read `stream` to the end and return the books it describes.
    ///
    /// The stream is closed before this returns, whether it succeeds or not.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Mapping` (or `Translation`) for the first row
    /// that cannot be mapped, including a row without a book id. No partial
    /// result is returned.
    pub fn aggregate<S, B, G, A>(
        stream: &mut S,
        book_mapper: &B,
        genre_mapper: &G,
        author_mapper: &A,
    ) -> Result<BTreeMap<BookId, Book>>
    where
        S: RowStream + ?Sized,
        B: RowMapper<Entity = Book> + ?Sized,
        G: RowMapper<Entity = Genre> + ?Sized,
        A: RowMapper<Entity = Author> + ?Sized,
    {
        let mut stream = StreamGuard(stream);

        let mut books: BTreeMap<BookId, Book> = BTreeMap::new();
        let mut genres: HashMap<GenreId, Arc<Genre>> = HashMap::new();
        let mut authors: HashMap<AuthorId, Arc<Author>> = HashMap::new();

        let mut row_index = 0usize;
        while let Some(row) = stream.next_row()? {
            let book_id = book_mapper
                .key(&row, row_index)?
                .map(BookId)
                .ok_or_else(|| CatalogError::Mapping {
                    column: book_mapper.translator().qualify("id"),
                    row: row_index,
                    message: "book id is NULL".to_string(),
                })?;

            if !books.contains_key(&book_id) {
                let book = book_mapper.map_row(&row, row_index)?;
                books.insert(book_id, book);
            }

            let genre = match genre_mapper.key(&row, row_index)? {
                Some(id) => Some(cached(&mut genres, GenreId(id), || {
                    genre_mapper.map_row(&row, row_index)
                })?),
                None => None,
            };
            let author = match author_mapper.key(&row, row_index)? {
                Some(id) => Some(cached(&mut authors, AuthorId(id), || {
                    author_mapper.map_row(&row, row_index)
                })?),
                None => None,
            };

            if let Some(book) = books.get_mut(&book_id) {
                if let Some(genre) = genre {
                    book.add_genre(genre);
                }
                if let Some(author) = author {
                    book.add_author(author);
                }
            }

            row_index += 1;
        }

        debug!(
            rows = row_index,
            books = books.len(),
            genres = genres.len(),
            authors = authors.len(),
            "Aggregated book result set"
        );

        Ok(books)
    }
}

fn cached<K, T>(
    cache: &mut HashMap<K, Arc<T>>,
    id: K,
    map: impl FnOnce() -> Result<T>,
) -> Result<Arc<T>>
where
    K: std::hash::Hash + Eq,
{
    if let Some(entity) = cache.get(&id) {
        return Ok(Arc::clone(entity));
    }
    let entity = Arc::new(map()?);
    cache.insert(id, Arc::clone(&entity));
    Ok(entity)
}

/// Closes the wrapped stream when dropped.
struct StreamGuard<'s, S: RowStream + ?Sized>(&'s mut S);

impl<S: RowStream + ?Sized> Deref for StreamGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.0
    }
}

impl<S: RowStream + ?Sized> DerefMut for StreamGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.0
    }
}

impl<S: RowStream + ?Sized> Drop for StreamGuard<'_, S> {
    fn drop(&mut self) {
        self.0.close();
    }
}
