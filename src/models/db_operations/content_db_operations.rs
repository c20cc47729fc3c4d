//! CRUD for the simple content entities: courses, banners, partners, team
//! members and students. All follow the repository conventions: `create`
//! stores a fully-built record, `update` reports NotFound for a missing id,
//! `delete` is a tolerant no-op.

use super::{ts_from_sql, DbError};
use crate::models::{Banner, Course, Partner, Student, TeamMember};
use rusqlite::{params, Connection, Row};

// --- Courses ---

fn row_to_course(row: &Row) -> rusqlite::Result<Course> {
    let created_at: String = row.get(6)?;
    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        image: row.get(3)?,
        duration: row.get(4)?,
        active: row.get(5)?,
        created_at: ts_from_sql(&created_at),
    })
}

pub fn create_course(conn: &Connection, course: &Course) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO courses (id, title, description, image, duration, active, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            course.id,
            course.title,
            course.description,
            course.image,
            course.duration,
            course.active,
            course.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn read_course(conn: &Connection, id: &str) -> Option<Course> {
    conn.query_row(
        "SELECT id, title, description, image, duration, active, created_at \
         FROM courses WHERE id = ?1",
        [id],
        row_to_course,
    )
    .ok()
}

pub fn read_courses(conn: &Connection, only_active: bool) -> Result<Vec<Course>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, image, duration, active, created_at \
         FROM courses WHERE (?1 = 0 OR active = 1) ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([only_active], row_to_course)?;
    Ok(rows.filter_map(|c| c.ok()).collect())
}

pub fn update_course(conn: &Connection, course: &Course) -> Result<(), DbError> {
    let changed = conn.execute(
        "UPDATE courses SET title = ?1, description = ?2, image = ?3, duration = ?4, \
         active = ?5 WHERE id = ?6",
        params![
            course.title,
            course.description,
            course.image,
            course.duration,
            course.active,
            course.id,
        ],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("Course {}", course.id)));
    }
    Ok(())
}

pub fn delete_course(conn: &Connection, id: &str) -> Result<usize, DbError> {
    Ok(conn.execute("DELETE FROM courses WHERE id = ?1", [id])?)
}

// --- Banners ---

fn row_to_banner(row: &Row) -> rusqlite::Result<Banner> {
    let created_at: String = row.get(6)?;
    Ok(Banner {
        id: row.get(0)?,
        title: row.get(1)?,
        image: row.get(2)?,
        link: row.get(3)?,
        active: row.get(4)?,
        display_order: row.get(5)?,
        created_at: ts_from_sql(&created_at),
    })
}

pub fn create_banner(conn: &Connection, banner: &Banner) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO banners (id, title, image, link, active, display_order, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            banner.id,
            banner.title,
            banner.image,
            banner.link,
            banner.active,
            banner.display_order,
            banner.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn read_banner(conn: &Connection, id: &str) -> Option<Banner> {
    conn.query_row(
        "SELECT id, title, image, link, active, display_order, created_at \
         FROM banners WHERE id = ?1",
        [id],
        row_to_banner,
    )
    .ok()
}

pub fn read_banners(conn: &Connection, only_active: bool) -> Result<Vec<Banner>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, image, link, active, display_order, created_at \
         FROM banners WHERE (?1 = 0 OR active = 1) ORDER BY display_order ASC",
    )?;
    let rows = stmt.query_map([only_active], row_to_banner)?;
    Ok(rows.filter_map(|b| b.ok()).collect())
}

pub fn update_banner(conn: &Connection, banner: &Banner) -> Result<(), DbError> {
    let changed = conn.execute(
        "UPDATE banners SET title = ?1, image = ?2, link = ?3, active = ?4, \
         display_order = ?5 WHERE id = ?6",
        params![
            banner.title,
            banner.image,
            banner.link,
            banner.active,
            banner.display_order,
            banner.id,
        ],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("Banner {}", banner.id)));
    }
    Ok(())
}

pub fn delete_banner(conn: &Connection, id: &str) -> Result<usize, DbError> {
    Ok(conn.execute("DELETE FROM banners WHERE id = ?1", [id])?)
}

// --- Partners ---

fn row_to_partner(row: &Row) -> rusqlite::Result<Partner> {
    let created_at: String = row.get(4)?;
    Ok(Partner {
        id: row.get(0)?,
        name: row.get(1)?,
        logo: row.get(2)?,
        website: row.get(3)?,
        created_at: ts_from_sql(&created_at),
    })
}

pub fn create_partner(conn: &Connection, partner: &Partner) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO partners (id, name, logo, website, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            partner.id,
            partner.name,
            partner.logo,
            partner.website,
            partner.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn read_partner(conn: &Connection, id: &str) -> Option<Partner> {
    conn.query_row(
        "SELECT id, name, logo, website, created_at FROM partners WHERE id = ?1",
        [id],
        row_to_partner,
    )
    .ok()
}

pub fn read_partners(conn: &Connection) -> Result<Vec<Partner>, DbError> {
    let mut stmt =
        conn.prepare("SELECT id, name, logo, website, created_at FROM partners ORDER BY name")?;
    let rows = stmt.query_map([], row_to_partner)?;
    Ok(rows.filter_map(|p| p.ok()).collect())
}

pub fn update_partner(conn: &Connection, partner: &Partner) -> Result<(), DbError> {
    let changed = conn.execute(
        "UPDATE partners SET name = ?1, logo = ?2, website = ?3 WHERE id = ?4",
        params![partner.name, partner.logo, partner.website, partner.id],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("Partner {}", partner.id)));
    }
    Ok(())
}

pub fn delete_partner(conn: &Connection, id: &str) -> Result<usize, DbError> {
    Ok(conn.execute("DELETE FROM partners WHERE id = ?1", [id])?)
}

// --- Team members ---

fn row_to_team_member(row: &Row) -> rusqlite::Result<TeamMember> {
    let created_at: String = row.get(6)?;
    Ok(TeamMember {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        photo: row.get(3)?,
        bio: row.get(4)?,
        display_order: row.get(5)?,
        created_at: ts_from_sql(&created_at),
    })
}

pub fn create_team_member(conn: &Connection, member: &TeamMember) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO team_members (id, name, role, photo, bio, display_order, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            member.id,
            member.name,
            member.role,
            member.photo,
            member.bio,
            member.display_order,
            member.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn read_team_member(conn: &Connection, id: &str) -> Option<TeamMember> {
    conn.query_row(
        "SELECT id, name, role, photo, bio, display_order, created_at \
         FROM team_members WHERE id = ?1",
        [id],
        row_to_team_member,
    )
    .ok()
}

pub fn read_team_members(conn: &Connection) -> Result<Vec<TeamMember>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, role, photo, bio, display_order, created_at \
         FROM team_members ORDER BY display_order ASC",
    )?;
    let rows = stmt.query_map([], row_to_team_member)?;
    Ok(rows.filter_map(|m| m.ok()).collect())
}

pub fn update_team_member(conn: &Connection, member: &TeamMember) -> Result<(), DbError> {
    let changed = conn.execute(
        "UPDATE team_members SET name = ?1, role = ?2, photo = ?3, bio = ?4, \
         display_order = ?5 WHERE id = ?6",
        params![
            member.name,
            member.role,
            member.photo,
            member.bio,
            member.display_order,
            member.id,
        ],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("TeamMember {}", member.id)));
    }
    Ok(())
}

pub fn delete_team_member(conn: &Connection, id: &str) -> Result<usize, DbError> {
    Ok(conn.execute("DELETE FROM team_members WHERE id = ?1", [id])?)
}

// --- Students ---

fn row_to_student(row: &Row) -> rusqlite::Result<Student> {
    let created_at: String = row.get(5)?;
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        photo: row.get(2)?,
        birth_date: row.get(3)?,
        class_group: row.get(4)?,
        created_at: ts_from_sql(&created_at),
    })
}

pub fn create_student(conn: &Connection, student: &Student) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO students (id, name, photo, birth_date, class_group, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            student.id,
            student.name,
            student.photo,
            student.birth_date,
            student.class_group,
            student.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn read_student(conn: &Connection, id: &str) -> Option<Student> {
    conn.query_row(
        "SELECT id, name, photo, birth_date, class_group, created_at \
         FROM students WHERE id = ?1",
        [id],
        row_to_student,
    )
    .ok()
}

pub fn read_students(conn: &Connection) -> Result<Vec<Student>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, photo, birth_date, class_group, created_at \
         FROM students ORDER BY name",
    )?;
    let rows = stmt.query_map([], row_to_student)?;
    Ok(rows.filter_map(|s| s.ok()).collect())
}

pub fn update_student(conn: &Connection, student: &Student) -> Result<(), DbError> {
    let changed = conn.execute(
        "UPDATE students SET name = ?1, photo = ?2, birth_date = ?3, class_group = ?4 \
         WHERE id = ?5",
        params![
            student.name,
            student.photo,
            student.birth_date,
            student.class_group,
            student.id,
        ],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("Student {}", student.id)));
    }
    Ok(())
}

pub fn delete_student(conn: &Connection, id: &str) -> Result<usize, DbError> {
    Ok(conn.execute("DELETE FROM students WHERE id = ?1", [id])?)
}
