use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create genres table
        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Genre::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // Uniqueness is kept by lookup-or-create, not by a constraint
                    .col(ColumnDef::new(Genre::Name).string().not_null())
                    .col(
                        ColumnDef::new(Genre::CreatedAt)
                            .integer()
                            .not_null()
                            .default(Expr::cust("(strftime('%s', 'now'))")),
                    )
                    .to_owned(),
            )
            .await?;

        // Create movies table
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movie::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movie::Title).string().not_null().unique_key())
                    .col(ColumnDef::new(Movie::FileName).string())
                    .col(ColumnDef::new(Movie::Description).text())
                    .col(ColumnDef::new(Movie::Rating).double())
                    .col(ColumnDef::new(Movie::MaturityRating).string())
                    .col(ColumnDef::new(Movie::ReleaseYear).integer())
                    .col(ColumnDef::new(Movie::ReleaseDate).date())
                    .col(ColumnDef::new(Movie::Duration).string())
                    .col(ColumnDef::new(Movie::MatchScore).integer())
                    .col(ColumnDef::new(Movie::PosterUrl).string())
                    .col(ColumnDef::new(Movie::BackdropUrl).string())
                    .col(ColumnDef::new(Movie::ThumbnailUrl).string())
                    .col(ColumnDef::new(Movie::Thumbnail).blob())
                    .col(ColumnDef::new(Movie::VideoUrl).string())
                    .col(
                        ColumnDef::new(Movie::CreatedAt)
                            .integer()
                            .not_null()
                            .default(Expr::cust("(strftime('%s', 'now'))")),
                    )
                    .col(
                        ColumnDef::new(Movie::UpdatedAt)
                            .integer()
                            .not_null()
                            .default(Expr::cust("(strftime('%s', 'now'))")),
                    )
                    .to_owned(),
            )
            .await?;

        // Create movie_genres junction table
        manager
            .create_table(
                Table::create()
                    .table(MovieGenre::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MovieGenre::MovieId).integer().not_null())
                    .col(ColumnDef::new(MovieGenre::GenreId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(MovieGenre::MovieId)
                            .col(MovieGenre::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genres_movie_id")
                            .from(MovieGenre::Table, MovieGenre::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genres_genre_id")
                            .from(MovieGenre::Table, MovieGenre::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::Email).string().not_null())
                    .col(ColumnDef::new(User::Password).string().not_null())
                    .col(ColumnDef::new(User::Username).string())
                    .col(ColumnDef::new(User::ProfilePicture).blob())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .integer()
                            .not_null()
                            .default(Expr::cust("(strftime('%s', 'now'))")),
                    )
                    .col(
                        ColumnDef::new(User::UpdatedAt)
                            .integer()
                            .not_null()
                            .default(Expr::cust("(strftime('%s', 'now'))")),
                    )
                    .to_owned(),
            )
            .await?;

        // Per-user movie lists. movie_id is stored by value, no foreign key.
        manager
            .create_table(
                Table::create()
                    .table(UserMovieList::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserMovieList::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserMovieList::UserId).integer().not_null())
                    .col(ColumnDef::new(UserMovieList::List).string().not_null())
                    .col(ColumnDef::new(UserMovieList::MovieId).integer().not_null())
                    .col(
                        ColumnDef::new(UserMovieList::CreatedAt)
                            .integer()
                            .not_null()
                            .default(Expr::cust("(strftime('%s', 'now'))")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_movie_lists_user_id")
                            .from(UserMovieList::Table, UserMovieList::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_genres_name")
                    .table(Genre::Table)
                    .col(Genre::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_movies_file_name")
                    .table(Movie::Table)
                    .col(Movie::FileName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_movie_genres_genre_id")
                    .table(MovieGenre::Table)
                    .col(MovieGenre::GenreId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(User::Table)
                    .col(User::Email)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_movie_lists_entry")
                    .table(UserMovieList::Table)
                    .col(UserMovieList::UserId)
                    .col(UserMovieList::List)
                    .col(UserMovieList::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(UserMovieList::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MovieGenre::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movie::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genre::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Genre {
    #[sea_orm(iden = "genres")]
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Movie {
    #[sea_orm(iden = "movies")]
    Table,
    Id,
    Title,
    FileName,
    Description,
    Rating,
    MaturityRating,
    ReleaseYear,
    ReleaseDate,
    Duration,
    MatchScore,
    PosterUrl,
    BackdropUrl,
    ThumbnailUrl,
    Thumbnail,
    VideoUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MovieGenre {
    #[sea_orm(iden = "movie_genres")]
    Table,
    MovieId,
    GenreId,
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Email,
    Password,
    Username,
    ProfilePicture,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserMovieList {
    #[sea_orm(iden = "user_movie_lists")]
    Table,
    Id,
    UserId,
    List,
    MovieId,
    CreatedAt,
}
